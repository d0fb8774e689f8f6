//! No-op collaborators for unit tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use inline_menu_core::Collaborators;
use inline_menu_protocols::{
    AutofillService, CredentialProvider, CredentialView, FillRequest, ProviderError,
    SettingsProvider, TabContext, VaultPopouts,
};

use crate::{FrameHub, SessionStatus};

struct Nothing;

#[async_trait]
impl CredentialProvider for Nothing {
    async fn credentials_for_tab(&self, _tab: &TabContext) -> Result<Vec<CredentialView>, ProviderError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl SettingsProvider for Nothing {
    async fn theme(&self) -> String {
        "light".to_string()
    }

    async fn translations(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    async fn show_favicons(&self) -> bool {
        false
    }
}

#[async_trait]
impl AutofillService for Nothing {
    async fn is_reprompt_required(&self, _credential: &CredentialView, _tab: &TabContext) -> bool {
        false
    }

    async fn fill(&self, _request: FillRequest<'_>) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[async_trait]
impl VaultPopouts for Nothing {
    async fn open_unlock(&self, _tab: &TabContext) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn open_view_item(&self, _tab: &TabContext, _credential_id: &str) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn open_password_reprompt(
        &self,
        _tab: &TabContext,
        _credential_id: &str,
    ) -> Result<(), ProviderError> {
        Ok(())
    }
}

pub(crate) fn collaborators(hub: Arc<FrameHub>, session: Arc<SessionStatus>) -> Collaborators {
    let nothing = Arc::new(Nothing);
    Collaborators {
        auth: session,
        credentials: nothing.clone(),
        settings: nothing.clone(),
        autofill: nothing.clone(),
        popouts: nothing,
        frames: hub,
    }
}
