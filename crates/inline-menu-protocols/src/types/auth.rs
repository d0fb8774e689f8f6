//! Authentication status as reported by the session collaborator.

use serde::{Deserialize, Serialize};

/// Vault authentication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthStatus {
    LoggedOut,
    Locked,
    Unlocked,
}

impl AuthStatus {
    /// Whether credentials can be read and filled.
    pub fn is_unlocked(self) -> bool {
        matches!(self, AuthStatus::Unlocked)
    }
}

impl Default for AuthStatus {
    fn default() -> Self {
        Self::LoggedOut
    }
}
