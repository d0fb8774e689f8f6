//! Positioning, visibility and the debounce pipeline callbacks.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};

use inline_menu_protocols::{
    FrameId, FrameRequest, MessageSender, SurfaceCommand, SurfaceKind, TabId, VisibilityStyles,
};

use crate::coordinator::Coordinator;
use crate::debounce::PipelineHandler;
use crate::focus::CloseRequest;
use crate::geometry::OffsetEntry;
use crate::position::{button_position, list_position};

impl Coordinator {
    /// Position one surface over the focused field of `tab`.
    pub async fn update_inline_menu_position(&self, kind: Option<SurfaceKind>, tab: TabId) {
        if let Some(kind) = kind {
            self.position_surface(kind, tab, true).await;
        }
    }

    /// Returns whether a position was pushed. With `retry`, an unresolved
    /// sub-frame offset schedules a rebuild and a settled retry.
    pub(crate) async fn position_surface(&self, kind: SurfaceKind, tab: TabId, retry: bool) -> bool {
        let Some(field) = self.focus.focused().filter(|field| field.tab_id() == tab) else {
            return false;
        };
        self.pipeline.cancel_settles();
        self.notify_frame(
            tab,
            FrameId::TOP,
            FrameRequest::AppendAutofillInlineMenuToDom {
                overlay_element: kind,
            },
        )
        .await;

        let entry = self
            .geometry
            .resolve_offset(self.collaborators.frames.as_ref(), tab, field.frame_id, false)
            .await;
        let offsets = match entry {
            OffsetEntry::Resolved(offsets) => offsets,
            OffsetEntry::Unresolved => {
                debug!(%tab, frame = %field.frame_id, %kind, "Sub-frame offset unresolved");
                if retry {
                    let sender = field.sender();
                    self.pipeline.rebuild_sub_frames.trigger(sender.clone());
                    self.pipeline.position_update.trigger(sender);
                }
                return false;
            }
        };

        let rects = &field.data.focused_field_rects;
        let styles = match kind {
            SurfaceKind::Button => button_position(rects, &field.data.focused_field_styles, &offsets),
            SurfaceKind::List => list_position(rects, &offsets),
        };
        if !self.post_to(tab, kind, SurfaceCommand::UpdateAutofillInlineMenuPosition { styles }) {
            trace!(%tab, %kind, "No surface to position");
        }
        self.pipeline.fade_in.trigger(tab);
        true
    }

    /// Show or hide every surface of `tab`. Only acts on the focused tab.
    pub fn toggle_hidden(&self, tab: TabId, hidden: bool, transparent: Option<bool>) {
        if !self.focus.is_focused_tab(tab) {
            return;
        }
        let styles = VisibilityStyles::new(hidden, transparent);
        for port in self.ports.live_ports(tab) {
            port.post(SurfaceCommand::ToggleAutofillInlineMenuHidden { styles });
            self.focus.set_visible(port.kind(), !hidden);
        }
        if transparent == Some(true) {
            self.pipeline.fade_in.trigger(tab);
        }
    }

    fn live_kinds(&self, tab: TabId) -> Vec<SurfaceKind> {
        self.ports
            .live_ports(tab)
            .iter()
            .map(|port| port.kind())
            .collect()
    }

    async fn close_after_reposition(&self, tab: TabId) {
        self.close_inline_menu(
            tab,
            CloseRequest {
                force: true,
                element: None,
            },
        )
        .await;
    }

    /// The list comes back after a reposition unless the field already holds
    /// a value and the list has nothing new to offer.
    async fn list_follows_reposition(&self, tab: TabId, frame: FrameId) -> bool {
        let has_value = match self
            .collaborators
            .frames
            .request(tab, frame, FrameRequest::CheckMostRecentlyFocusedFieldHasValue)
            .await
        {
            Ok(Some(Value::Bool(has_value))) => has_value,
            Ok(_) => false,
            Err(e) => {
                debug!(%tab, %frame, error = %e, "Field value check failed");
                false
            }
        };
        if !has_value {
            return true;
        }
        let unlocked = self.collaborators.auth.auth_status().await.is_unlocked();
        unlocked && !self.projection.is_populated(tab)
    }

    async fn focused_field_within_viewport(&self, tab: TabId) -> bool {
        let Some(field) = self.focus.focused().filter(|field| field.tab_id() == tab) else {
            return false;
        };
        let request = FrameRequest::CheckIsMostRecentlyFocusedFieldWithinViewport;
        match self
            .collaborators
            .frames
            .request(tab, field.frame_id, request)
            .await
        {
            Ok(Some(Value::Bool(within))) => within,
            Ok(_) => false,
            Err(e) => {
                debug!(%tab, frame = %field.frame_id, error = %e, "Viewport check failed");
                false
            }
        }
    }
}

#[async_trait]
impl PipelineHandler for Coordinator {
    async fn reposition_settled(&self, sender: MessageSender) {
        let tab = sender.tab_id();
        let Some(field) = self.focus.focused().filter(|field| field.tab_id() == tab) else {
            return;
        };
        if !self.focus.is_field_focused() || !self.focused_field_within_viewport(tab).await {
            self.close_after_reposition(tab).await;
            return;
        }

        if !field.frame_id.is_top() {
            self.pipeline.rebuild_sub_frames.trigger(sender.clone());
            self.pipeline.position_update.trigger(sender);
            return;
        }

        let list_follows = self.list_follows_reposition(tab, field.frame_id).await;
        self.toggle_hidden(tab, false, Some(true));
        for kind in self.live_kinds(tab) {
            if kind == SurfaceKind::List && !list_follows {
                continue;
            }
            self.position_surface(kind, tab, true).await;
        }
        if !list_follows {
            let request = CloseRequest {
                force: true,
                element: Some(SurfaceKind::List),
            };
            self.close_inline_menu(tab, request).await;
        }
    }

    async fn rebuild_sub_frame_offsets(&self, sender: MessageSender) {
        let tab = sender.tab_id();
        let Some(field) = self.focus.focused().filter(|field| field.tab_id() == tab) else {
            return;
        };
        if field.frame_id.is_top() {
            return;
        }
        let resolved = self
            .geometry
            .rebuild_tab(self.collaborators.frames.as_ref(), tab)
            .await;
        trace!(%tab, resolved, "Rebuilt sub-frame offsets");
    }

    async fn position_update_settled(&self, sender: MessageSender) {
        let tab = sender.tab_id();
        if !self.focus.is_focused_tab(tab) {
            return;
        }
        self.toggle_hidden(tab, false, Some(true));
        for kind in self.live_kinds(tab) {
            self.position_surface(kind, tab, false).await;
        }
    }

    async fn fade_in(&self, tab: TabId) {
        if self.focus.is_focused_tab(tab) {
            self.post_to_all(tab, SurfaceCommand::FadeInAutofillInlineMenuIframe);
        }
    }
}
