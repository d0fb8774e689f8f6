//! Vault session status as last reported to the host.

use async_trait::async_trait;
use parking_lot::RwLock;

use inline_menu_protocols::{AuthStatus, AuthStatusProvider};

#[derive(Debug, Default)]
pub struct SessionStatus {
    status: RwLock<AuthStatus>,
}

impl SessionStatus {
    pub fn new(status: AuthStatus) -> Self {
        Self {
            status: RwLock::new(status),
        }
    }

    pub fn get(&self) -> AuthStatus {
        *self.status.read()
    }

    /// Store a new status. Returns whether it changed.
    pub fn set(&self, status: AuthStatus) -> bool {
        let mut current = self.status.write();
        let changed = *current != status;
        *current = status;
        changed
    }
}

#[async_trait]
impl AuthStatusProvider for SessionStatus {
    async fn auth_status(&self) -> AuthStatus {
        self.get()
    }
}
