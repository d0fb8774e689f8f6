//! Collaborators backed by the configuration file.
//!
//! The host has no vault of its own: credentials come from a JSON file, the
//! session status from `[vault]` and later `POST /session` calls, and fills
//! and popouts are only logged.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use tracing::info;
use url::Url;

use inline_menu_config::{AppearanceConfig, ConfigError, ConfigLoader, VaultConfig};
use inline_menu_protocols::{
    AuthStatus, AutofillService, CredentialProvider, CredentialType, CredentialView, FillRequest,
    ProviderError, SettingsProvider, TabContext, VaultPopouts,
};

/// Parse `vault.auth_status`.
pub(crate) fn initial_auth_status(vault: &VaultConfig) -> Result<AuthStatus, ConfigError> {
    serde_json::from_value(serde_json::Value::String(vault.auth_status.clone())).map_err(|_| {
        ConfigError::InvalidValue {
            field: "vault.auth_status".to_string(),
            message: format!("Unknown auth status: {}", vault.auth_status),
        }
    })
}

fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url)
        .or_else(|_| Url::parse(&format!("http://{}", url)))
        .ok()?;
    parsed.host_str().map(|host| host.trim_start_matches("www.").to_string())
}

/// Credentials read once from `vault.credentials_file`.
pub(crate) struct JsonCredentialProvider {
    credentials: Vec<CredentialView>,
}

impl JsonCredentialProvider {
    pub(crate) fn new(credentials: Vec<CredentialView>) -> Self {
        Self { credentials }
    }

    pub(crate) fn from_config(vault: &VaultConfig) -> Result<Self, ConfigError> {
        match &vault.credentials_file {
            Some(path) => Self::load(Path::new(&ConfigLoader::expand_path(&path.to_string_lossy()))),
            None => Ok(Self::new(Vec::new())),
        }
    }

    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let credentials: Vec<CredentialView> = serde_json::from_str(&content)?;
        Ok(Self::new(credentials))
    }

    pub(crate) fn len(&self) -> usize {
        self.credentials.len()
    }

    fn matches_tab(credential: &CredentialView, tab_host: Option<&str>) -> bool {
        let (Some(tab_host), Some(login)) = (tab_host, &credential.login) else {
            return false;
        };
        login
            .uris
            .iter()
            .filter_map(|uri| host_of(uri))
            .any(|host| tab_host == host || tab_host.ends_with(&format!(".{}", host)))
    }
}

#[async_trait]
impl CredentialProvider for JsonCredentialProvider {
    /// Logins for the tab's site first, then cards and identities; favorites
    /// lead within each group. Logins for other sites are left out.
    async fn credentials_for_tab(&self, tab: &TabContext) -> Result<Vec<CredentialView>, ProviderError> {
        let tab_host = tab.url.as_deref().and_then(host_of);
        let mut matched: Vec<CredentialView> = self
            .credentials
            .iter()
            .filter(|credential| match credential.credential_type {
                CredentialType::Login => Self::matches_tab(credential, tab_host.as_deref()),
                _ => true,
            })
            .cloned()
            .collect();
        matched.sort_by_key(|credential| {
            (
                credential.credential_type != CredentialType::Login,
                !credential.favorite,
            )
        });
        Ok(matched)
    }
}

/// Theme, translations and favicons from `[appearance]`.
pub(crate) struct ConfiguredSettings {
    appearance: AppearanceConfig,
}

impl ConfiguredSettings {
    pub(crate) fn new(appearance: AppearanceConfig) -> Self {
        Self { appearance }
    }
}

#[async_trait]
impl SettingsProvider for ConfiguredSettings {
    async fn theme(&self) -> String {
        self.appearance.theme.clone()
    }

    async fn translations(&self) -> BTreeMap<String, String> {
        self.appearance.translations.clone()
    }

    async fn show_favicons(&self) -> bool {
        self.appearance.show_favicons
    }
}

/// Records fills instead of performing them.
pub(crate) struct LoggingAutofill;

#[async_trait]
impl AutofillService for LoggingAutofill {
    async fn is_reprompt_required(&self, credential: &CredentialView, _tab: &TabContext) -> bool {
        credential.reprompt
    }

    async fn fill(&self, request: FillRequest<'_>) -> Result<(), ProviderError> {
        info!(
            tab = %request.tab.id,
            credential = %request.credential.id,
            frames = request.page_details.len(),
            "Fill requested"
        );
        Ok(())
    }
}

/// Records popout requests instead of opening windows.
pub(crate) struct LoggingVaultPopouts;

#[async_trait]
impl VaultPopouts for LoggingVaultPopouts {
    async fn open_unlock(&self, tab: &TabContext) -> Result<(), ProviderError> {
        info!(tab = %tab.id, "Unlock popout requested");
        Ok(())
    }

    async fn open_view_item(&self, tab: &TabContext, credential_id: &str) -> Result<(), ProviderError> {
        info!(tab = %tab.id, credential = credential_id, "View item popout requested");
        Ok(())
    }

    async fn open_password_reprompt(
        &self,
        tab: &TabContext,
        credential_id: &str,
    ) -> Result<(), ProviderError> {
        info!(tab = %tab.id, credential = credential_id, "Password reprompt requested");
        Ok(())
    }
}

#[cfg(test)]
#[path = "adapters_tests.rs"]
mod tests;
