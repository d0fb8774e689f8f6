//! Messages exchanged with page frames.
//!
//! Page frames talk to the coordinator with one-shot request/response
//! messages. The sender's tab and frame identity travel alongside the message
//! (see [`MessageSender`]); these messages are not signed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::surface::SurfaceKind;
use crate::types::{AuthStatus, FocusedFieldData, FrameId, SubFrameOffsets, TabId};

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;

/// Tab the message originated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabContext {
    pub id: TabId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl TabContext {
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            url: None,
            title: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Origin of an inbound message: which tab and which frame within it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSender {
    pub tab: TabContext,
    pub frame_id: FrameId,
    /// URL of the sending frame's document.
    #[serde(default)]
    pub url: Option<String>,
}

impl MessageSender {
    pub fn new(tab: TabContext, frame_id: FrameId) -> Self {
        Self {
            tab,
            frame_id,
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn tab_id(&self) -> TabId {
        self.tab.id
    }
}

/// Page details captured for one frame of a tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDetails {
    pub frame_id: FrameId,
    pub tab: TabContext,
    /// Opaque form field metadata produced by the page scraping scripts.
    pub details: Value,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl PageDetails {
    /// Whether the scraped details contain at least one form field.
    pub fn has_fields(&self) -> bool {
        self.details
            .get("fields")
            .and_then(Value::as_array)
            .map(|fields| !fields.is_empty())
            .unwrap_or(false)
    }
}

/// Position of a frame in its tab's frame tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameDetails {
    pub frame_id: FrameId,
    /// `None` for the top-level frame.
    pub parent_frame_id: Option<FrameId>,
    pub url: String,
}

/// Reference to a sub-frame carried by some frame messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubFrameRef {
    pub frame_id: FrameId,
}

/// Direction in which keyboard focus leaves a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusDirection {
    Previous,
    Next,
    Current,
}

/// Commands sent by page frames to the coordinator.
///
/// Unrecognised commands decode to [`FrameMessage::Unknown`] so newer page
/// scripts never break an older coordinator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FrameMessage {
    CollectPageDetailsResponse {
        details: Value,
    },
    UpdateFocusedFieldData {
        focused_field_data: FocusedFieldData,
    },
    UpdateIsFieldCurrentlyFocused {
        is_field_currently_focused: bool,
    },
    UpdateIsFieldCurrentlyFilling {
        is_field_currently_filling: bool,
    },
    CheckIsFieldCurrentlyFocused,
    CheckIsFieldCurrentlyFilling,
    UpdateSubFrameData {
        sub_frame_data: SubFrameOffsets,
    },
    TriggerAutofillOverlayReposition,
    TriggerSubFrameFocusInRebuild,
    DestroyAutofillInlineMenuListeners {
        #[serde(default)]
        sub_frame_data: Option<SubFrameRef>,
    },
    CheckIsAutofillInlineMenuButtonVisible,
    CheckIsAutofillInlineMenuListVisible,
    CheckIsInlineMenuCiphersPopulated,
    OpenAutofillInlineMenu {
        #[serde(default)]
        is_opening_full_inline_menu: bool,
    },
    CloseAutofillInlineMenu {
        #[serde(default)]
        overlay_element: Option<SurfaceKind>,
        #[serde(default)]
        force_close_inline_menu: bool,
    },
    AutofillOverlayElementClosed {
        overlay_element: SurfaceKind,
    },
    UpdateAutofillInlineMenuPosition {
        #[serde(default)]
        overlay_element: Option<SurfaceKind>,
    },
    ToggleAutofillInlineMenuHidden {
        is_inline_menu_hidden: bool,
        #[serde(default)]
        set_transparent_inline_menu: Option<bool>,
    },
    UpdateAutofillInlineMenuElementIsVisibleStatus {
        overlay_element: SurfaceKind,
        is_visible: bool,
    },
    CheckAutofillInlineMenuFocused,
    FocusAutofillInlineMenuList,
    #[serde(other)]
    Unknown,
}

impl FrameMessage {
    /// Wire name of the command, for logging.
    pub fn command_name(&self) -> &'static str {
        match self {
            FrameMessage::CollectPageDetailsResponse { .. } => "collectPageDetailsResponse",
            FrameMessage::UpdateFocusedFieldData { .. } => "updateFocusedFieldData",
            FrameMessage::UpdateIsFieldCurrentlyFocused { .. } => "updateIsFieldCurrentlyFocused",
            FrameMessage::UpdateIsFieldCurrentlyFilling { .. } => "updateIsFieldCurrentlyFilling",
            FrameMessage::CheckIsFieldCurrentlyFocused => "checkIsFieldCurrentlyFocused",
            FrameMessage::CheckIsFieldCurrentlyFilling => "checkIsFieldCurrentlyFilling",
            FrameMessage::UpdateSubFrameData { .. } => "updateSubFrameData",
            FrameMessage::TriggerAutofillOverlayReposition => "triggerAutofillOverlayReposition",
            FrameMessage::TriggerSubFrameFocusInRebuild => "triggerSubFrameFocusInRebuild",
            FrameMessage::DestroyAutofillInlineMenuListeners { .. } => {
                "destroyAutofillInlineMenuListeners"
            }
            FrameMessage::CheckIsAutofillInlineMenuButtonVisible => {
                "checkIsAutofillInlineMenuButtonVisible"
            }
            FrameMessage::CheckIsAutofillInlineMenuListVisible => {
                "checkIsAutofillInlineMenuListVisible"
            }
            FrameMessage::CheckIsInlineMenuCiphersPopulated => "checkIsInlineMenuCiphersPopulated",
            FrameMessage::OpenAutofillInlineMenu { .. } => "openAutofillInlineMenu",
            FrameMessage::CloseAutofillInlineMenu { .. } => "closeAutofillInlineMenu",
            FrameMessage::AutofillOverlayElementClosed { .. } => "autofillOverlayElementClosed",
            FrameMessage::UpdateAutofillInlineMenuPosition { .. } => {
                "updateAutofillInlineMenuPosition"
            }
            FrameMessage::ToggleAutofillInlineMenuHidden { .. } => "toggleAutofillInlineMenuHidden",
            FrameMessage::UpdateAutofillInlineMenuElementIsVisibleStatus { .. } => {
                "updateAutofillInlineMenuElementIsVisibleStatus"
            }
            FrameMessage::CheckAutofillInlineMenuFocused => "checkAutofillInlineMenuFocused",
            FrameMessage::FocusAutofillInlineMenuList => "focusAutofillInlineMenuList",
            FrameMessage::Unknown => "unknown",
        }
    }
}

/// Commands the coordinator sends into page frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FrameRequest {
    /// Ask a parent frame where its child frame element sits.
    GetSubFrameOffsets {
        sub_frame_url: String,
        sub_frame_id: FrameId,
    },
    /// Ask a frame to compute its own offsets by walking `postMessage` upwards.
    GetSubFrameOffsetsFromWindowMessage {
        sub_frame_id: FrameId,
    },
    CheckIsMostRecentlyFocusedFieldWithinViewport,
    CheckMostRecentlyFocusedFieldHasValue,
    UnsetMostRecentlyFocusedField,
    DestroyAutofillInlineMenuListeners,
    OpenAutofillInlineMenu {
        is_focusing_field_element: bool,
        is_opening_full_inline_menu: bool,
        auth_status: AuthStatus,
    },
    CloseAutofillInlineMenu {
        overlay_element: Option<SurfaceKind>,
    },
    RedirectAutofillInlineMenuFocusOut {
        direction: FocusDirection,
    },
    AppendAutofillInlineMenuToDom {
        overlay_element: SurfaceKind,
    },
}

impl FrameRequest {
    /// Wire name of the command, for logging.
    pub fn command_name(&self) -> &'static str {
        match self {
            FrameRequest::GetSubFrameOffsets { .. } => "getSubFrameOffsets",
            FrameRequest::GetSubFrameOffsetsFromWindowMessage { .. } => {
                "getSubFrameOffsetsFromWindowMessage"
            }
            FrameRequest::CheckIsMostRecentlyFocusedFieldWithinViewport => {
                "checkIsMostRecentlyFocusedFieldWithinViewport"
            }
            FrameRequest::CheckMostRecentlyFocusedFieldHasValue => {
                "checkMostRecentlyFocusedFieldHasValue"
            }
            FrameRequest::UnsetMostRecentlyFocusedField => "unsetMostRecentlyFocusedField",
            FrameRequest::DestroyAutofillInlineMenuListeners => "destroyAutofillInlineMenuListeners",
            FrameRequest::OpenAutofillInlineMenu { .. } => "openAutofillInlineMenu",
            FrameRequest::CloseAutofillInlineMenu { .. } => "closeAutofillInlineMenu",
            FrameRequest::RedirectAutofillInlineMenuFocusOut { .. } => {
                "redirectAutofillInlineMenuFocusOut"
            }
            FrameRequest::AppendAutofillInlineMenuToDom { .. } => "appendAutofillInlineMenuToDom",
        }
    }
}
