//! Messages exchanged with the two inline menu surfaces over long-lived ports.
//!
//! Every inbound surface message must carry the tab's signing key in a
//! top-level `signingKey` field. The command set of the button surface and the
//! list surface are disjoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::frame::FocusDirection;
use crate::types::{AuthStatus, CredentialProjectionEntry, PositionStyles};

#[cfg(test)]
#[path = "surface_tests.rs"]
mod tests;

/// One of the two renderable inline menu surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SurfaceKind {
    #[serde(rename = "autofill-inline-menu-button")]
    Button,
    #[serde(rename = "autofill-inline-menu-list")]
    List,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 2] = [SurfaceKind::Button, SurfaceKind::List];

    /// Port name the surface connects with.
    pub fn port_name(self) -> &'static str {
        match self {
            SurfaceKind::Button => "autofill-inline-menu-button-port",
            SurfaceKind::List => "autofill-inline-menu-list-port",
        }
    }

    /// Channel name the surface must use for its replies.
    pub fn reply_channel_name(self) -> &'static str {
        match self {
            SurfaceKind::Button => "autofill-inline-menu-button-message-connector",
            SurfaceKind::List => "autofill-inline-menu-list-message-connector",
        }
    }

    /// Resolve a surface from its port name.
    pub fn from_port_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.port_name() == name)
    }
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceKind::Button => write!(f, "button"),
            SurfaceKind::List => write!(f, "list"),
        }
    }
}

/// Handshake payload posted to a surface right after it connects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitSurface {
    pub surface_document_url: String,
    pub surface_title: String,
    pub auth_status: AuthStatus,
    pub style_sheet_url: String,
    pub theme: String,
    pub translations: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<CredentialProjectionEntry>>,
    pub signing_key: String,
    pub reply_channel_name: String,
}

/// Display/opacity toggle for a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisibilityStyles {
    pub display: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<&'static str>,
}

impl VisibilityStyles {
    pub fn new(hidden: bool, transparent: Option<bool>) -> Self {
        Self {
            display: if hidden { "none" } else { "block" },
            opacity: transparent.map(|t| if t { "0" } else { "1" }),
        }
    }
}

/// Commands the coordinator posts to a surface. Posting never waits for a reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SurfaceCommand {
    #[serde(rename = "initAutofillInlineMenuButton")]
    InitButton(InitSurface),
    #[serde(rename = "initAutofillInlineMenuList")]
    InitList(InitSurface),
    UpdateAutofillInlineMenuPosition {
        styles: PositionStyles,
    },
    ToggleAutofillInlineMenuHidden {
        styles: VisibilityStyles,
    },
    FadeInAutofillInlineMenuIframe,
    UpdateAutofillInlineMenuListCiphers {
        credentials: Vec<CredentialProjectionEntry>,
    },
    CloseAutofillInlineMenu,
    CheckAutofillInlineMenuButtonFocused,
    CheckAutofillInlineMenuListFocused,
    FocusAutofillInlineMenuList,
    UpdateAutofillInlineMenuColorScheme,
}

impl SurfaceCommand {
    /// Wire name of the command, for logging and assertions.
    pub fn command_name(&self) -> &'static str {
        match self {
            SurfaceCommand::InitButton(_) => "initAutofillInlineMenuButton",
            SurfaceCommand::InitList(_) => "initAutofillInlineMenuList",
            SurfaceCommand::UpdateAutofillInlineMenuPosition { .. } => {
                "updateAutofillInlineMenuPosition"
            }
            SurfaceCommand::ToggleAutofillInlineMenuHidden { .. } => {
                "toggleAutofillInlineMenuHidden"
            }
            SurfaceCommand::FadeInAutofillInlineMenuIframe => "fadeInAutofillInlineMenuIframe",
            SurfaceCommand::UpdateAutofillInlineMenuListCiphers { .. } => {
                "updateAutofillInlineMenuListCiphers"
            }
            SurfaceCommand::CloseAutofillInlineMenu => "closeAutofillInlineMenu",
            SurfaceCommand::CheckAutofillInlineMenuButtonFocused => {
                "checkAutofillInlineMenuButtonFocused"
            }
            SurfaceCommand::CheckAutofillInlineMenuListFocused => {
                "checkAutofillInlineMenuListFocused"
            }
            SurfaceCommand::FocusAutofillInlineMenuList => "focusAutofillInlineMenuList",
            SurfaceCommand::UpdateAutofillInlineMenuColorScheme => {
                "updateAutofillInlineMenuColorScheme"
            }
        }
    }
}

/// Commands accepted from the button surface.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ButtonPortMessage {
    AutofillInlineMenuButtonClicked,
    AutofillInlineMenuBlurred,
    RedirectAutofillInlineMenuFocusOut { direction: FocusDirection },
    UpdateAutofillInlineMenuColorScheme,
    #[serde(other)]
    Unknown,
}

/// Commands accepted from the list surface.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ListPortMessage {
    CheckAutofillInlineMenuButtonFocused,
    AutofillInlineMenuBlurred,
    UnlockVault,
    FillAutofillInlineMenuCipher { inline_menu_cipher_id: String },
    ViewSelectedCipher { inline_menu_cipher_id: String },
    RedirectAutofillInlineMenuFocusOut { direction: FocusDirection },
    UpdateAutofillInlineMenuListHeight { styles: PositionStyles },
    #[serde(other)]
    Unknown,
}

/// Detach the `signingKey` field from an inbound surface message.
///
/// Returns the key (if present and a string) and the remaining message.
pub fn split_signing_key(mut message: Value) -> (Option<String>, Value) {
    let key = message
        .as_object_mut()
        .and_then(|map| map.remove("signingKey"))
        .and_then(|value| match value {
            Value::String(key) => Some(key),
            _ => None,
        });
    (key, message)
}
