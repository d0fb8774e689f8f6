//! Interfaces of the collaborators the coordinator consumes.
//!
//! Credential storage, session state, settings, form filling and the page
//! messaging transport all live outside the coordinator. They are reached only
//! through these traits.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{FrameError, ProviderError};
use crate::frame::{FrameDetails, FrameRequest, MessageSender, PageDetails, TabContext};
use crate::surface::{SurfaceCommand, SurfaceKind};
use crate::types::{AuthStatus, CredentialView, FrameId, PortId, TabId};

/// Read-only view of the vault session.
#[async_trait]
pub trait AuthStatusProvider: Send + Sync {
    async fn auth_status(&self) -> AuthStatus;
}

/// Read/sort access to decrypted credentials.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Credentials relevant to the tab, already sorted by relevance.
    async fn credentials_for_tab(&self, tab: &TabContext) -> Result<Vec<CredentialView>, ProviderError>;
}

/// User settings, theming and translations.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn theme(&self) -> String;

    async fn translations(&self) -> BTreeMap<String, String>;

    async fn show_favicons(&self) -> bool;
}

/// A fill request handed to the autofill collaborator.
#[derive(Debug, Clone)]
pub struct FillRequest<'a> {
    pub tab: &'a TabContext,
    pub credential: &'a CredentialView,
    pub page_details: Vec<PageDetails>,
}

/// Performs the actual form fill.
#[async_trait]
pub trait AutofillService: Send + Sync {
    /// Whether the user must re-enter the master password before this fill.
    async fn is_reprompt_required(&self, credential: &CredentialView, tab: &TabContext) -> bool;

    async fn fill(&self, request: FillRequest<'_>) -> Result<(), ProviderError>;
}

/// Extension popouts opened on the user's behalf.
#[async_trait]
pub trait VaultPopouts: Send + Sync {
    async fn open_unlock(&self, tab: &TabContext) -> Result<(), ProviderError>;

    async fn open_view_item(&self, tab: &TabContext, credential_id: &str) -> Result<(), ProviderError>;

    /// Ask for the master password, then fill `credential_id` into the tab.
    async fn open_password_reprompt(
        &self,
        tab: &TabContext,
        credential_id: &str,
    ) -> Result<(), ProviderError>;
}

/// Request/response transport into page frames.
#[async_trait]
pub trait FrameMessenger: Send + Sync {
    /// Send a request to one frame and wait for its answer.
    ///
    /// `Ok(None)` means the frame answered without a value.
    async fn request(
        &self,
        tab: TabId,
        frame: FrameId,
        request: FrameRequest,
    ) -> Result<Option<Value>, FrameError>;

    /// Send a command to one frame without waiting for an answer.
    async fn notify(&self, tab: TabId, frame: FrameId, request: FrameRequest) -> Result<(), FrameError>;

    /// Position of a frame in its tab's frame tree, `None` when unknown.
    async fn frame_details(&self, tab: TabId, frame: FrameId) -> Option<FrameDetails>;
}

/// A long-lived duplex channel to one surface.
pub trait SurfacePort: Send + Sync {
    fn id(&self) -> PortId;

    fn kind(&self) -> SurfaceKind;

    /// The tab and frame that hosts this surface.
    fn sender(&self) -> &MessageSender;

    /// Post a command. Delivery is fire-and-forget.
    fn post(&self, command: SurfaceCommand);

    /// Close the channel.
    fn disconnect(&self);
}
