//! Collaborator errors.

use thiserror::Error;

/// Errors reported by external collaborators (vault, autofill, popouts).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Vault is locked")]
    Locked,

    #[error("Provider failed: {0}")]
    Failed(String),
}
