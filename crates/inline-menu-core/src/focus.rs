//! Focus and visibility state machine.
//!
//! At most one field is focused across all tabs. Visibility of the two
//! surfaces is only changed through the methods here.

use parking_lot::Mutex;

use inline_menu_protocols::{
    FocusedFieldData, FrameId, MessageSender, SurfaceKind, TabContext, TabId,
};

/// The most recently focused field.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusedField {
    pub tab: TabContext,
    pub frame_id: FrameId,
    pub data: FocusedFieldData,
}

impl FocusedField {
    pub fn tab_id(&self) -> TabId {
        self.tab.id
    }

    pub fn sender(&self) -> MessageSender {
        MessageSender::new(self.tab.clone(), self.frame_id)
    }
}

/// Observable phase of the menu.
///
/// Closing is not a phase of its own: [`FocusState::close`] applies a close
/// under one lock, so callers only ever see the state before or after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPhase {
    Idle,
    FieldFocused,
    Visible { button: bool, list: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CloseRequest {
    pub force: bool,
    /// Close only this surface; both when `None`.
    pub element: Option<SurfaceKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloseEffect {
    /// Surfaces the close applies to.
    pub targets: Vec<SurfaceKind>,
    /// Targets that were visible before the close.
    pub hidden: Vec<SurfaceKind>,
}

impl CloseEffect {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// The command's `overlayElement`: `None` means both surfaces.
    pub fn element(&self) -> Option<SurfaceKind> {
        match self.targets.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    focused: Option<FocusedField>,
    field_focused: bool,
    field_filling: bool,
    button_visible: bool,
    list_visible: bool,
}

impl State {
    fn visible_mut(&mut self, kind: SurfaceKind) -> &mut bool {
        match kind {
            SurfaceKind::Button => &mut self.button_visible,
            SurfaceKind::List => &mut self.list_visible,
        }
    }
}

#[derive(Debug, Default)]
pub struct FocusState {
    state: Mutex<State>,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly focused field.
    ///
    /// Returns the tab and frame that held focus before when it was a
    /// different frame; that frame must unset its own focused field.
    pub fn focus(&self, sender: &MessageSender, data: FocusedFieldData) -> Option<(TabId, FrameId)> {
        let mut state = self.state.lock();
        let previous = state
            .focused
            .as_ref()
            .map(|field| (field.tab_id(), field.frame_id))
            .filter(|&(tab, frame)| tab != sender.tab_id() || frame != sender.frame_id);
        state.focused = Some(FocusedField {
            tab: sender.tab.clone(),
            frame_id: sender.frame_id,
            data,
        });
        previous
    }

    pub fn focused(&self) -> Option<FocusedField> {
        self.state.lock().focused.clone()
    }

    pub fn is_focused_tab(&self, tab: TabId) -> bool {
        self.state
            .lock()
            .focused
            .as_ref()
            .is_some_and(|field| field.tab_id() == tab)
    }

    pub fn is_focused_frame(&self, sender: &MessageSender) -> bool {
        self.state.lock().focused.as_ref().is_some_and(|field| {
            field.tab_id() == sender.tab_id() && field.frame_id == sender.frame_id
        })
    }

    pub fn set_field_focused(&self, focused: bool) {
        self.state.lock().field_focused = focused;
    }

    pub fn is_field_focused(&self) -> bool {
        self.state.lock().field_focused
    }

    pub fn set_field_filling(&self, filling: bool) {
        self.state.lock().field_filling = filling;
    }

    pub fn is_field_filling(&self) -> bool {
        self.state.lock().field_filling
    }

    pub fn set_visible(&self, kind: SurfaceKind, visible: bool) {
        *self.state.lock().visible_mut(kind) = visible;
    }

    pub fn set_all_visible(&self, visible: bool) {
        let mut state = self.state.lock();
        state.button_visible = visible;
        state.list_visible = visible;
    }

    pub fn is_visible(&self, kind: SurfaceKind) -> bool {
        match kind {
            SurfaceKind::Button => self.state.lock().button_visible,
            SurfaceKind::List => self.state.lock().list_visible,
        }
    }

    /// Apply a close request.
    ///
    /// A forced close always applies. Otherwise the close is ignored while a
    /// field is focused, and only the list closes while a field is filling.
    pub fn close(&self, request: CloseRequest) -> CloseEffect {
        let mut state = self.state.lock();
        if !request.force && state.field_focused {
            return CloseEffect::default();
        }

        let mut targets: Vec<SurfaceKind> = match request.element {
            Some(kind) => vec![kind],
            None => SurfaceKind::ALL.to_vec(),
        };
        if !request.force && state.field_filling {
            targets.retain(|kind| *kind == SurfaceKind::List);
        }

        let mut hidden = Vec::new();
        for kind in &targets {
            let visible = state.visible_mut(*kind);
            if *visible {
                hidden.push(*kind);
            }
            *visible = false;
        }
        CloseEffect { targets, hidden }
    }

    /// Forget the focused field when it belongs to `tab`.
    pub fn clear_tab(&self, tab: TabId) -> bool {
        let mut state = self.state.lock();
        if !state.focused.as_ref().is_some_and(|field| field.tab_id() == tab) {
            return false;
        }
        *state = State::default();
        true
    }

    /// Forget the focused field when it lives in this frame.
    pub fn clear_frame(&self, tab: TabId, frame: FrameId) -> bool {
        let mut state = self.state.lock();
        let matches = state
            .focused
            .as_ref()
            .is_some_and(|field| field.tab_id() == tab && field.frame_id == frame);
        if matches {
            state.focused = None;
            state.field_focused = false;
            state.field_filling = false;
        }
        matches
    }

    pub fn phase(&self) -> MenuPhase {
        let state = self.state.lock();
        match (&state.focused, state.button_visible, state.list_visible) {
            (None, false, false) => MenuPhase::Idle,
            (Some(_), false, false) => MenuPhase::FieldFocused,
            (_, button, list) => MenuPhase::Visible { button, list },
        }
    }
}
