//! Handlers for messages sent by page frames.

use serde_json::Value;
use tracing::debug;

use inline_menu_protocols::{
    FocusedFieldData, FrameId, FrameRequest, MessageSender, PageDetails, SubFrameOffsets,
    SubFrameRef, SurfaceCommand, SurfaceKind, TabId,
};

use crate::coordinator::Coordinator;
use crate::error::CoordinatorError;
use crate::focus::CloseRequest;

impl Coordinator {
    /// A frame finished collecting its page details.
    ///
    /// Sub-frames that detected fields get their offset resolved up front so
    /// the first focus inside them can be positioned without a round-trip.
    pub async fn collect_page_details(&self, details: Value, sender: &MessageSender) {
        let page_details = PageDetails {
            frame_id: sender.frame_id,
            tab: sender.tab.clone(),
            details,
            source_url: sender.url.clone(),
        };
        let has_fields = page_details.has_fields();
        self.page_details.store(page_details);

        if has_fields && !sender.frame_id.is_top() {
            self.geometry
                .resolve_offset(
                    self.collaborators.frames.as_ref(),
                    sender.tab_id(),
                    sender.frame_id,
                    false,
                )
                .await;
        }
    }

    /// A field gained focus in `sender`'s frame.
    pub async fn update_focused_field_data(
        &self,
        data: FocusedFieldData,
        sender: &MessageSender,
    ) -> Result<(), CoordinatorError> {
        let previous_tab = self.focus.focused().map(|field| field.tab_id());
        if let Some((tab, frame)) = self.focus.focus(sender, data) {
            self.notify_frame(tab, frame, FrameRequest::UnsetMostRecentlyFocusedField)
                .await;
        }

        if previous_tab != Some(sender.tab_id()) {
            self.update_inline_menu_ciphers(&sender.tab).await?;
        }
        Ok(())
    }

    pub fn update_is_field_currently_focused(&self, focused: bool) {
        self.focus.set_field_focused(focused);
    }

    pub fn update_is_field_currently_filling(&self, filling: bool) {
        self.focus.set_field_filling(filling);
    }

    pub fn check_is_field_currently_focused(&self) -> bool {
        self.focus.is_field_focused()
    }

    pub fn check_is_field_currently_filling(&self) -> bool {
        self.focus.is_field_filling()
    }

    /// The page resolved its own offset by walking `postMessage` up the chain.
    pub fn update_sub_frame_data(&self, offsets: SubFrameOffsets, sender: &MessageSender) {
        self.geometry
            .update_from_page(sender.tab_id(), sender.frame_id, offsets);
        if self.focus.is_focused_frame(sender) {
            self.pipeline.position_update.trigger(sender.clone());
        }
    }

    /// Scroll or resize in the focused tab: hide now, reposition once it settles.
    pub fn trigger_reposition(&self, sender: &MessageSender) {
        if !self.focus.is_focused_tab(sender.tab_id()) {
            return;
        }
        self.pipeline.cancel_settles();
        self.toggle_hidden(sender.tab_id(), true, None);
        self.pipeline.reposition.trigger(sender.clone());
    }

    /// A sub-frame gained focus: its cached offsets may be stale.
    pub fn trigger_sub_frame_focus_in_rebuild(&self, sender: &MessageSender) {
        self.pipeline.cancel_settles();
        self.pipeline.rebuild_sub_frames.trigger(sender.clone());
        self.pipeline.reposition.trigger(sender.clone());
    }

    /// Tear down the inline menu listeners of a frame, the sender's own by default.
    pub async fn destroy_inline_menu_listeners(
        &self,
        sub_frame: Option<SubFrameRef>,
        sender: &MessageSender,
    ) {
        let frame = sub_frame.map(|sub| sub.frame_id).unwrap_or(sender.frame_id);
        self.notify_frame(
            sender.tab_id(),
            frame,
            FrameRequest::DestroyAutofillInlineMenuListeners,
        )
        .await;
    }

    pub fn check_is_surface_visible(&self, kind: SurfaceKind) -> bool {
        self.focus.is_visible(kind)
    }

    pub fn check_is_inline_menu_ciphers_populated(&self, sender: &MessageSender) -> bool {
        self.focus.is_focused_tab(sender.tab_id()) && self.projection.is_populated(sender.tab_id())
    }

    /// Ask the page to open the inline menu on the focused field of `tab`,
    /// or on the top frame when focus is elsewhere.
    pub async fn open_inline_menu(
        &self,
        tab: TabId,
        is_focusing_field_element: bool,
        is_opening_full_inline_menu: bool,
    ) {
        let frame = self
            .focus
            .focused()
            .filter(|field| field.tab_id() == tab)
            .map(|field| field.frame_id)
            .unwrap_or(FrameId::TOP);
        let auth_status = self.collaborators.auth.auth_status().await;
        self.notify_frame(
            tab,
            frame,
            FrameRequest::OpenAutofillInlineMenu {
                is_focusing_field_element,
                is_opening_full_inline_menu,
                auth_status,
            },
        )
        .await;
    }

    /// Close the surfaces of `tab` according to the focus rules.
    pub async fn close_inline_menu(&self, tab: TabId, request: CloseRequest) {
        let effect = self.focus.close(request);
        if effect.is_empty() {
            debug!(%tab, force = request.force, "Close ignored");
            return;
        }

        let mut open = !effect.hidden.is_empty();
        for kind in &effect.targets {
            open |= self.post_to(tab, *kind, SurfaceCommand::CloseAutofillInlineMenu);
        }
        if !open {
            return;
        }

        self.notify_frame(
            tab,
            FrameId::TOP,
            FrameRequest::CloseAutofillInlineMenu {
                overlay_element: effect.element(),
            },
        )
        .await;
    }

    /// The page removed one of the surface elements.
    pub fn overlay_element_closed(&self, kind: SurfaceKind, sender: &MessageSender) {
        if !self.focus.is_focused_tab(sender.tab_id()) {
            self.ports.retire_if_stale();
            return;
        }
        self.ports.close_live(sender.tab_id(), kind);
        self.focus.set_visible(kind, false);
    }

    /// A surface reported whether it is currently displayed.
    pub fn update_element_is_visible_status(
        &self,
        kind: SurfaceKind,
        is_visible: bool,
        sender: &MessageSender,
    ) {
        if self.focus.is_focused_tab(sender.tab_id()) {
            self.focus.set_visible(kind, is_visible);
        }
    }

    /// Ask both surfaces whether they hold focus.
    pub fn check_inline_menu_focused(&self, sender: &MessageSender) {
        let tab = sender.tab_id();
        if !self.focus.is_focused_tab(tab) {
            return;
        }
        self.post_to(
            tab,
            SurfaceKind::Button,
            SurfaceCommand::CheckAutofillInlineMenuButtonFocused,
        );
        self.post_to(
            tab,
            SurfaceKind::List,
            SurfaceCommand::CheckAutofillInlineMenuListFocused,
        );
    }

    pub fn focus_inline_menu_list(&self, sender: &MessageSender) {
        let tab = sender.tab_id();
        if self.focus.is_focused_tab(tab) {
            self.post_to(tab, SurfaceKind::List, SurfaceCommand::FocusAutofillInlineMenuList);
        }
    }

    /// Fire-and-forget frame notification. Failures are logged and dropped.
    pub(crate) async fn notify_frame(&self, tab: TabId, frame: FrameId, request: FrameRequest) {
        let command = request.command_name();
        if let Err(e) = self.collaborators.frames.notify(tab, frame, request).await {
            debug!(%tab, %frame, command, error = %e, "Frame notification failed");
        }
    }
}
