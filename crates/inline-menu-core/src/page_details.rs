//! Per-tab page details reported by frames that detected form fields.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use inline_menu_protocols::{FrameId, PageDetails, TabId};

#[derive(Default)]
pub struct PageDetailsStore {
    tabs: Mutex<HashMap<TabId, BTreeMap<FrameId, PageDetails>>>,
}

impl PageDetailsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, details: PageDetails) {
        self.tabs
            .lock()
            .entry(details.tab.id)
            .or_default()
            .insert(details.frame_id, details);
    }

    /// Every frame's details, top frame first. Empty unless the top frame has
    /// reported.
    pub fn valid_frames(&self, tab: TabId) -> Vec<PageDetails> {
        let tabs = self.tabs.lock();
        match tabs.get(&tab) {
            Some(frames) if frames.contains_key(&FrameId::TOP) => frames.values().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn get(&self, tab: TabId, frame: FrameId) -> Option<PageDetails> {
        self.tabs
            .lock()
            .get(&tab)
            .and_then(|frames| frames.get(&frame))
            .cloned()
    }

    /// Forget one frame. A tab left without its top frame is purged.
    pub fn remove_frame(&self, tab: TabId, frame: FrameId) {
        let mut tabs = self.tabs.lock();
        let Some(frames) = tabs.get_mut(&tab) else {
            return;
        };
        frames.remove(&frame);
        if !frames.contains_key(&FrameId::TOP) {
            tabs.remove(&tab);
        }
    }

    pub fn remove_tab(&self, tab: TabId) {
        self.tabs.lock().remove(&tab);
    }

    pub fn frame_count(&self, tab: TabId) -> usize {
        self.tabs.lock().get(&tab).map(BTreeMap::len).unwrap_or(0)
    }
}
