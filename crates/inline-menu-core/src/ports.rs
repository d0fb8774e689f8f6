//! Port registry: the live and expired surface channels of every tab.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use inline_menu_protocols::{PortId, SurfaceKind, SurfacePort, TabId};

const SIGNING_KEY_LEN: usize = 12;

fn generate_signing_key() -> String {
    Uuid::new_v4().simple().to_string()[..SIGNING_KEY_LEN].to_string()
}

/// The surfaces connected for one tab.
///
/// A channel is never reused for a new connection: the previous live channel
/// of the same kind moves to `expired` and stays open until retired.
pub struct PortPair {
    signing_key: String,
    button: Option<Arc<dyn SurfacePort>>,
    list: Option<Arc<dyn SurfacePort>>,
    expired: Vec<Arc<dyn SurfacePort>>,
}

impl PortPair {
    fn new() -> Self {
        Self {
            signing_key: generate_signing_key(),
            button: None,
            list: None,
            expired: Vec::new(),
        }
    }

    pub fn signing_key(&self) -> &str {
        &self.signing_key
    }

    fn slot(&mut self, kind: SurfaceKind) -> &mut Option<Arc<dyn SurfacePort>> {
        match kind {
            SurfaceKind::Button => &mut self.button,
            SurfaceKind::List => &mut self.list,
        }
    }

    fn live(&self, kind: SurfaceKind) -> Option<&Arc<dyn SurfacePort>> {
        match kind {
            SurfaceKind::Button => self.button.as_ref(),
            SurfaceKind::List => self.list.as_ref(),
        }
    }
}

/// Outcome of registering a new surface connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub signing_key: String,
    /// The live channel this connection displaced into the expired pool.
    pub replaced: Option<PortId>,
}

/// Where a disconnected port was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    Live { tab: TabId, kind: SurfaceKind },
    Expired { tab: TabId },
}

#[derive(Default)]
pub struct PortRegistry {
    tabs: Mutex<HashMap<TabId, PortPair>>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `port` the live channel of its kind for its tab.
    pub fn register(&self, port: Arc<dyn SurfacePort>) -> Registration {
        let tab = port.sender().tab_id();
        let kind = port.kind();
        let id = port.id();

        let mut tabs = self.tabs.lock();
        let pair = tabs.entry(tab).or_insert_with(PortPair::new);
        let previous = pair.slot(kind).replace(port);
        let replaced = previous.map(|old| {
            let old_id = old.id();
            pair.expired.push(old);
            old_id
        });

        info!(%tab, %kind, port = %id, replaced = ?replaced, "Surface connected");
        Registration {
            signing_key: pair.signing_key.clone(),
            replaced,
        }
    }

    pub fn lookup(&self, tab: TabId, kind: SurfaceKind) -> Option<Arc<dyn SurfacePort>> {
        self.tabs
            .lock()
            .get(&tab)
            .and_then(|pair| pair.live(kind).cloned())
    }

    /// Live channels of a tab, button first.
    pub fn live_ports(&self, tab: TabId) -> Vec<Arc<dyn SurfacePort>> {
        let tabs = self.tabs.lock();
        let Some(pair) = tabs.get(&tab) else {
            return Vec::new();
        };
        SurfaceKind::ALL
            .into_iter()
            .filter_map(|kind| pair.live(kind).cloned())
            .collect()
    }

    pub fn signing_key(&self, tab: TabId) -> Option<String> {
        self.tabs.lock().get(&tab).map(|pair| pair.signing_key.clone())
    }

    /// Whether `key` is the signing key of `tab`.
    pub fn verify(&self, tab: TabId, key: Option<&str>) -> bool {
        match (key, self.tabs.lock().get(&tab)) {
            (Some(key), Some(pair)) => pair.signing_key == key,
            _ => false,
        }
    }

    /// Disconnect and forget every expired channel of every tab.
    pub fn retire_if_stale(&self) -> usize {
        let drained: Vec<Arc<dyn SurfacePort>> = self
            .tabs
            .lock()
            .values_mut()
            .flat_map(|pair| pair.expired.drain(..))
            .collect();
        for port in &drained {
            port.disconnect();
        }
        if !drained.is_empty() {
            debug!(count = drained.len(), "Retired expired surface channels");
        }
        drained.len()
    }

    /// Disconnect the live channel of `kind`. Returns whether one existed.
    pub fn close_live(&self, tab: TabId, kind: SurfaceKind) -> bool {
        let port = self
            .tabs
            .lock()
            .get_mut(&tab)
            .and_then(|pair| pair.slot(kind).take());
        match port {
            Some(port) => {
                port.disconnect();
                true
            }
            None => false,
        }
    }

    /// A surface closed its own channel. Forget it without disconnecting it.
    pub fn port_disconnected(&self, port: PortId) -> Option<Released> {
        let mut tabs = self.tabs.lock();
        for (tab, pair) in tabs.iter_mut() {
            for kind in SurfaceKind::ALL {
                if pair.live(kind).is_some_and(|live| live.id() == port) {
                    pair.slot(kind).take();
                    return Some(Released::Live { tab: *tab, kind });
                }
            }
            if let Some(index) = pair.expired.iter().position(|old| old.id() == port) {
                pair.expired.remove(index);
                return Some(Released::Expired { tab: *tab });
            }
        }
        None
    }

    /// Disconnect everything of a tab and forget its signing key.
    pub fn remove_tab(&self, tab: TabId) {
        let Some(pair) = self.tabs.lock().remove(&tab) else {
            return;
        };
        for port in pair
            .button
            .into_iter()
            .chain(pair.list)
            .chain(pair.expired)
        {
            port.disconnect();
        }
    }

    pub fn expired_count(&self, tab: TabId) -> usize {
        self.tabs
            .lock()
            .get(&tab)
            .map(|pair| pair.expired.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "ports_tests.rs"]
mod tests;
