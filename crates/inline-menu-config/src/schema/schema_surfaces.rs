//! Surface documents, appearance and the static vault view served by the binary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::default_true;

/// Documents loaded into the two surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfacesConfig {
    #[serde(default = "default_button_url")]
    pub button_url: String,

    #[serde(default = "default_list_url")]
    pub list_url: String,

    #[serde(default = "default_style_sheet_url_button")]
    pub style_sheet_url_button: String,

    #[serde(default = "default_style_sheet_url_list")]
    pub style_sheet_url_list: String,

    /// Base URL of the favicon service, `<base>/<host>/icon.png`.
    #[serde(default = "default_icons_server_url")]
    pub icons_server_url: String,
}

impl Default for SurfacesConfig {
    fn default() -> Self {
        Self {
            button_url: default_button_url(),
            list_url: default_list_url(),
            style_sheet_url_button: default_style_sheet_url_button(),
            style_sheet_url_list: default_style_sheet_url_list(),
            icons_server_url: default_icons_server_url(),
        }
    }
}

fn default_button_url() -> String {
    "overlay/menu-button.html".to_string()
}

fn default_list_url() -> String {
    "overlay/menu-list.html".to_string()
}

fn default_style_sheet_url_button() -> String {
    "overlay/menu-button.css".to_string()
}

fn default_style_sheet_url_list() -> String {
    "overlay/menu-list.css".to_string()
}

fn default_icons_server_url() -> String {
    "https://icons.inline-menu.local".to_string()
}

/// Theme, favicons and translated strings handed to the surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppearanceConfig {
    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default = "default_true")]
    pub show_favicons: bool,

    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            show_favicons: default_true(),
            translations: BTreeMap::new(),
        }
    }
}

fn default_theme() -> String {
    "light".to_string()
}

/// Vault session as seen by the standalone binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// One of `loggedOut`, `locked`, `unlocked`.
    #[serde(default = "default_auth_status")]
    pub auth_status: String,

    /// JSON array of credential views; logins are offered on matching sites.
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            auth_status: default_auth_status(),
            credentials_file: None,
        }
    }
}

fn default_auth_status() -> String {
    "unlocked".to_string()
}

/// Accepted values of `vault.auth_status`.
pub const AUTH_STATUS_VALUES: [&str; 3] = ["loggedOut", "locked", "unlocked"];
