//! Credential projection: the page-safe view of a tab's credentials.
//!
//! Entries carry a synthetic id of the form `inline-menu-cipher-<n>` so the
//! surfaces never see a credential's real identifier.

use std::collections::HashMap;

use parking_lot::Mutex;
use url::Url;

use inline_menu_protocols::{
    CredentialProjectionEntry, CredentialType, CredentialView, IconRef, LoginHint, TabId,
};

const EPHEMERAL_ID_PREFIX: &str = "inline-menu-cipher-";

fn fallback_icon(credential_type: CredentialType) -> &'static str {
    match credential_type {
        CredentialType::Login => "icon-globe",
        CredentialType::Card => "icon-credit-card",
        CredentialType::Identity => "icon-id-card",
        CredentialType::SecureNote => "icon-sticky-note",
    }
}

/// Host of the first login URI that can carry a favicon.
fn favicon_host(credential: &CredentialView) -> Option<String> {
    let uri = credential.login.as_ref()?.uris.first()?;
    let parsed = match Url::parse(uri) {
        Ok(url) => url,
        Err(_) if !uri.contains("://") && uri.contains('.') => Url::parse(&format!("http://{}", uri)).ok()?,
        Err(_) => return None,
    };
    match parsed.scheme() {
        "http" | "https" => parsed.host_str().map(str::to_string),
        _ => None,
    }
}

/// Icon for one credential.
pub fn build_icon(credential: &CredentialView, show_favicons: bool, icons_server_url: &str) -> IconRef {
    let icon = fallback_icon(credential.credential_type).to_string();
    let image = if show_favicons && credential.credential_type == CredentialType::Login {
        favicon_host(credential)
            .map(|host| format!("{}/{}/icon.png", icons_server_url.trim_end_matches('/'), host))
    } else {
        None
    };
    IconRef {
        image_enabled: show_favicons,
        image,
        icon,
    }
}

fn project_entry(
    ephemeral_id: &str,
    credential: &CredentialView,
    show_favicons: bool,
    icons_server_url: &str,
) -> CredentialProjectionEntry {
    CredentialProjectionEntry {
        ephemeral_id: ephemeral_id.to_string(),
        name: credential.name.clone(),
        credential_type: credential.credential_type,
        reprompt_required: credential.reprompt,
        favorite: credential.favorite,
        icon_ref: build_icon(credential, show_favicons, icons_server_url),
        login_hint: credential.login.as_ref().map(|login| LoginHint {
            username: login.username.clone(),
        }),
        card_hint: credential.card.as_ref().and_then(|card| card.sub_title()),
    }
}

/// Per-tab ordered credentials keyed by ephemeral id.
pub struct CredentialProjection {
    icons_server_url: String,
    tabs: Mutex<HashMap<TabId, Vec<(String, CredentialView)>>>,
}

impl CredentialProjection {
    pub fn new(icons_server_url: impl Into<String>) -> Self {
        Self {
            icons_server_url: icons_server_url.into(),
            tabs: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the tab's credentials, keeping the caller's order.
    pub fn replace(&self, tab: TabId, credentials: Vec<CredentialView>) {
        let entries = credentials
            .into_iter()
            .enumerate()
            .map(|(index, credential)| (format!("{}{}", EPHEMERAL_ID_PREFIX, index), credential))
            .collect();
        self.tabs.lock().insert(tab, entries);
    }

    /// Wire entries for the list surface, in current order.
    pub fn project(&self, tab: TabId, show_favicons: bool) -> Vec<CredentialProjectionEntry> {
        self.tabs
            .lock()
            .get(&tab)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(id, credential)| {
                        project_entry(id, credential, show_favicons, &self.icons_server_url)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get(&self, tab: TabId, ephemeral_id: &str) -> Option<CredentialView> {
        self.tabs.lock().get(&tab).and_then(|entries| {
            entries
                .iter()
                .find(|(id, _)| id == ephemeral_id)
                .map(|(_, credential)| credential.clone())
        })
    }

    /// Move an entry to the front. Returns whether it was found.
    pub fn promote(&self, tab: TabId, ephemeral_id: &str) -> bool {
        let mut tabs = self.tabs.lock();
        let Some(entries) = tabs.get_mut(&tab) else {
            return false;
        };
        match entries.iter().position(|(id, _)| id == ephemeral_id) {
            Some(index) => {
                let entry = entries.remove(index);
                entries.insert(0, entry);
                true
            }
            None => false,
        }
    }

    pub fn is_populated(&self, tab: TabId) -> bool {
        self.tabs.lock().get(&tab).is_some_and(|entries| !entries.is_empty())
    }

    pub fn remove_tab(&self, tab: TabId) {
        self.tabs.lock().remove(&tab);
    }

    /// Forget every tab's credentials, e.g. when the vault locks.
    pub fn clear(&self) {
        self.tabs.lock().clear();
    }
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod tests;
