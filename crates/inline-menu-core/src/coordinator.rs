//! The coordinator: owns every component and implements the command handlers.
//!
//! Handlers are spread over sibling files by concern:
//! - `coordinator_frames.rs`: messages from page frames
//! - `coordinator_surfaces.rs`: surface connections and signed surface messages
//! - `coordinator_position.rs`: positioning, visibility and the pipeline callbacks
//! - `coordinator_lifecycle.rs`: credentials, auth changes, tab and frame teardown

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use inline_menu_config::{Config, DebounceConfig, GeometryConfig, SurfacesConfig};
use inline_menu_protocols::{
    AuthStatusProvider, AutofillService, CredentialProvider, FrameMessenger, SettingsProvider,
    SurfaceCommand, SurfaceKind, TabContext, TabId, VaultPopouts,
};

use crate::debounce::EventPipeline;
use crate::focus::FocusState;
use crate::geometry::GeometryCache;
use crate::page_details::PageDetailsStore;
use crate::ports::PortRegistry;
use crate::projection::CredentialProjection;

/// The parts of the configuration the coordinator reads.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorSettings {
    pub debounce: DebounceConfig,
    pub geometry: GeometryConfig,
    pub surfaces: SurfacesConfig,
}

impl CoordinatorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: config.debounce.clone(),
            geometry: config.geometry.clone(),
            surfaces: config.surfaces.clone(),
        }
    }
}

/// External collaborators.
#[derive(Clone)]
pub struct Collaborators {
    pub auth: Arc<dyn AuthStatusProvider>,
    pub credentials: Arc<dyn CredentialProvider>,
    pub settings: Arc<dyn SettingsProvider>,
    pub autofill: Arc<dyn AutofillService>,
    pub popouts: Arc<dyn VaultPopouts>,
    pub frames: Arc<dyn FrameMessenger>,
}

/// An action deferred until the vault unlocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    OpenInlineMenu,
    Fill { ephemeral_id: String },
}

pub struct Coordinator {
    pub(crate) settings: CoordinatorSettings,
    pub(crate) collaborators: Collaborators,
    pub(crate) geometry: GeometryCache,
    pub(crate) ports: PortRegistry,
    pub(crate) focus: FocusState,
    pub(crate) page_details: PageDetailsStore,
    pub(crate) projection: CredentialProjection,
    pub(crate) pipeline: EventPipeline,
    pub(crate) pending: Mutex<HashMap<TabId, (TabContext, Vec<PendingAction>)>>,
}

impl Coordinator {
    pub fn new(settings: CoordinatorSettings, collaborators: Collaborators) -> Arc<Self> {
        Arc::new_cyclic(|coordinator| Self {
            geometry: GeometryCache::new(&settings.geometry),
            ports: PortRegistry::new(),
            focus: FocusState::new(),
            page_details: PageDetailsStore::new(),
            projection: CredentialProjection::new(settings.surfaces.icons_server_url.clone()),
            pipeline: EventPipeline::new(&settings.debounce, coordinator.clone()),
            pending: Mutex::new(HashMap::new()),
            settings,
            collaborators,
        })
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    pub fn focus(&self) -> &FocusState {
        &self.focus
    }

    pub fn ports(&self) -> &PortRegistry {
        &self.ports
    }

    pub fn geometry(&self) -> &GeometryCache {
        &self.geometry
    }

    pub fn page_details(&self) -> &PageDetailsStore {
        &self.page_details
    }

    pub fn projection(&self) -> &CredentialProjection {
        &self.projection
    }

    pub fn pipeline(&self) -> &EventPipeline {
        &self.pipeline
    }

    /// Actions waiting for the vault to unlock on `tab`.
    pub fn pending_actions(&self, tab: TabId) -> Vec<PendingAction> {
        self.pending
            .lock()
            .get(&tab)
            .map(|(_, actions)| actions.clone())
            .unwrap_or_default()
    }

    pub(crate) fn queue_action(&self, tab: &TabContext, action: PendingAction) {
        let mut pending = self.pending.lock();
        let (_, actions) = pending
            .entry(tab.id)
            .or_insert_with(|| (tab.clone(), Vec::new()));
        if !actions.contains(&action) {
            actions.push(action);
        }
    }

    /// Post to the live surface of `kind`, if one is connected.
    pub(crate) fn post_to(&self, tab: TabId, kind: SurfaceKind, command: SurfaceCommand) -> bool {
        match self.ports.lookup(tab, kind) {
            Some(port) => {
                port.post(command);
                true
            }
            None => false,
        }
    }

    /// Post to every live surface of the tab.
    pub(crate) fn post_to_all(&self, tab: TabId, command: SurfaceCommand) {
        for port in self.ports.live_ports(tab) {
            port.post(command.clone());
        }
    }
}
