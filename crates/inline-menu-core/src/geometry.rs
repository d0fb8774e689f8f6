//! Geometry cache: cumulative offsets of sub-frames relative to the top frame.
//!
//! Offsets are resolved lazily by walking the frame's ancestry and asking each
//! parent where the child frame element sits. The walk is bounded by
//! `max_sub_frame_depth`; a frame that exceeds it has its inline menu
//! listeners torn down once until it navigates.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, error, warn};

use inline_menu_config::GeometryConfig;
use inline_menu_protocols::{
    FrameDetails, FrameId, FrameMessenger, FrameRequest, LocalFrameOffset, SubFrameOffsets, TabId,
};

/// A cached offset, or the explicit marker that it cannot be computed yet.
#[derive(Debug, Clone, PartialEq)]
pub enum OffsetEntry {
    Resolved(SubFrameOffsets),
    Unresolved,
}

impl OffsetEntry {
    pub fn resolved(&self) -> Option<&SubFrameOffsets> {
        match self {
            OffsetEntry::Resolved(offsets) => Some(offsets),
            OffsetEntry::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, OffsetEntry::Resolved(_))
    }
}

/// Why a walk stopped without an offset.
enum BrokenHop {
    /// The frame is not part of a known frame tree.
    UnknownFrame,
    /// A probe failed or timed out.
    ProbeFailed,
    /// A parent could not locate the child frame element.
    ParentCannotLocate,
    /// Ancestry reached the depth bound.
    DepthExceeded,
}

/// Per-tab cache of sub-frame offsets.
pub struct GeometryCache {
    max_depth: usize,
    probe_timeout: Duration,
    tabs: Mutex<HashMap<TabId, HashMap<FrameId, OffsetEntry>>>,
    torn_down: Mutex<HashSet<(TabId, FrameId)>>,
}

impl GeometryCache {
    pub fn new(config: &GeometryConfig) -> Self {
        Self {
            max_depth: config.max_sub_frame_depth,
            probe_timeout: config.probe_timeout(),
            tabs: Mutex::new(HashMap::new()),
            torn_down: Mutex::new(HashSet::new()),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Offset of `frame` in `tab`.
    ///
    /// The top frame always resolves to zero and is never cached. A cached
    /// resolved entry is returned as is unless `force_rebuild` is set; an
    /// unresolved entry is always retried.
    pub async fn resolve_offset(
        &self,
        frames: &dyn FrameMessenger,
        tab: TabId,
        frame: FrameId,
        force_rebuild: bool,
    ) -> OffsetEntry {
        if frame.is_top() {
            let url = frames
                .frame_details(tab, frame)
                .await
                .map(|details| details.url)
                .unwrap_or_default();
            return OffsetEntry::Resolved(SubFrameOffsets::top_level(url));
        }

        if !force_rebuild {
            if let Some(entry @ OffsetEntry::Resolved(_)) = self.cached(tab, frame) {
                return entry;
            }
        }

        let entry = match self.walk(frames, tab, frame).await {
            Ok(offsets) => OffsetEntry::Resolved(offsets),
            Err(hop) => {
                self.handle_broken_hop(frames, tab, frame, hop).await;
                OffsetEntry::Unresolved
            }
        };
        self.store(tab, frame, entry.clone());
        entry
    }

    async fn walk(
        &self,
        frames: &dyn FrameMessenger,
        tab: TabId,
        frame: FrameId,
    ) -> Result<SubFrameOffsets, BrokenHop> {
        let mut current: FrameDetails = frames
            .frame_details(tab, frame)
            .await
            .ok_or(BrokenHop::UnknownFrame)?;
        let mut offsets = SubFrameOffsets {
            url: current.url.clone(),
            top: 0.0,
            left: 0.0,
            parent_frame_ids: Vec::new(),
        };
        let mut depth = 0;

        while let Some(parent) = current.parent_frame_id {
            depth += 1;
            if depth >= self.max_depth {
                return Err(BrokenHop::DepthExceeded);
            }

            let local = self.probe(frames, tab, parent, &current).await?;
            offsets.top += local.top;
            offsets.left += local.left;
            if !offsets.parent_frame_ids.contains(&parent) {
                offsets.parent_frame_ids.insert(0, parent);
            }

            if parent.is_top() {
                break;
            }
            current = frames
                .frame_details(tab, parent)
                .await
                .ok_or(BrokenHop::UnknownFrame)?;
        }

        Ok(offsets)
    }

    async fn probe(
        &self,
        frames: &dyn FrameMessenger,
        tab: TabId,
        parent: FrameId,
        child: &FrameDetails,
    ) -> Result<LocalFrameOffset, BrokenHop> {
        let request = FrameRequest::GetSubFrameOffsets {
            sub_frame_url: child.url.clone(),
            sub_frame_id: child.frame_id,
        };
        let answer = match tokio::time::timeout(self.probe_timeout, frames.request(tab, parent, request)).await {
            Err(_) => {
                debug!(%tab, %parent, child = %child.frame_id, "Sub-frame offset probe timed out");
                return Err(BrokenHop::ProbeFailed);
            }
            Ok(Err(e)) => {
                debug!(%tab, %parent, child = %child.frame_id, error = %e, "Sub-frame offset probe failed");
                return Err(BrokenHop::ProbeFailed);
            }
            Ok(Ok(answer)) => answer,
        };

        match answer {
            None | Some(Value::Null) => Err(BrokenHop::ParentCannotLocate),
            Some(value) => serde_json::from_value(value).map_err(|e| {
                warn!(%tab, %parent, error = %e, "Malformed sub-frame offset answer");
                BrokenHop::ProbeFailed
            }),
        }
    }

    async fn handle_broken_hop(
        &self,
        frames: &dyn FrameMessenger,
        tab: TabId,
        frame: FrameId,
        hop: BrokenHop,
    ) {
        let request = match hop {
            BrokenHop::UnknownFrame => {
                debug!(%tab, %frame, "Frame is not in a known frame tree");
                return;
            }
            BrokenHop::ProbeFailed => FrameRequest::DestroyAutofillInlineMenuListeners,
            BrokenHop::ParentCannotLocate => {
                FrameRequest::GetSubFrameOffsetsFromWindowMessage { sub_frame_id: frame }
            }
            BrokenHop::DepthExceeded => {
                if !self.torn_down.lock().insert((tab, frame)) {
                    return;
                }
                error!(
                    %tab,
                    %frame,
                    max_depth = self.max_depth,
                    "Sub-frame nesting exceeds the maximum depth, tearing down inline menu listeners"
                );
                FrameRequest::DestroyAutofillInlineMenuListeners
            }
        };

        let command = request.command_name();
        if let Err(e) = frames.notify(tab, frame, request).await {
            debug!(%tab, %frame, command, error = %e, "Could not notify frame");
        }
    }

    /// Store an offset reported by the page itself.
    pub fn update_from_page(&self, tab: TabId, frame: FrameId, offsets: SubFrameOffsets) {
        self.store(tab, frame, OffsetEntry::Resolved(offsets));
    }

    /// Re-resolve every cached frame of the tab. Returns how many resolved.
    pub async fn rebuild_tab(&self, frames: &dyn FrameMessenger, tab: TabId) -> usize {
        let mut resolved = 0;
        for frame in self.cached_frames(tab) {
            if self.resolve_offset(frames, tab, frame, true).await.is_resolved() {
                resolved += 1;
            }
        }
        resolved
    }

    pub fn cached(&self, tab: TabId, frame: FrameId) -> Option<OffsetEntry> {
        self.tabs
            .lock()
            .get(&tab)
            .and_then(|entries| entries.get(&frame))
            .cloned()
    }

    pub fn store(&self, tab: TabId, frame: FrameId, entry: OffsetEntry) {
        self.tabs.lock().entry(tab).or_default().insert(frame, entry);
    }

    pub fn cached_frames(&self, tab: TabId) -> Vec<FrameId> {
        let mut frames: Vec<FrameId> = self
            .tabs
            .lock()
            .get(&tab)
            .map(|entries| entries.keys().copied().collect())
            .unwrap_or_default();
        frames.sort();
        frames
    }

    /// Forget a frame, e.g. after it navigated. Re-arms its depth teardown.
    pub fn remove_frame(&self, tab: TabId, frame: FrameId) {
        let mut tabs = self.tabs.lock();
        if let Some(entries) = tabs.get_mut(&tab) {
            entries.remove(&frame);
            if entries.is_empty() {
                tabs.remove(&tab);
            }
        }
        drop(tabs);
        self.torn_down.lock().remove(&(tab, frame));
    }

    pub fn remove_tab(&self, tab: TabId) {
        self.tabs.lock().remove(&tab);
        self.torn_down.lock().retain(|(t, _)| *t != tab);
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
