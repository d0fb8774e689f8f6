//! Credential refresh, auth status changes and tab/frame teardown.

use std::mem;

use tracing::{info, warn};

use inline_menu_protocols::{AuthStatus, FrameId, SurfaceCommand, SurfaceKind, TabContext, TabId};

use crate::coordinator::{Coordinator, PendingAction};
use crate::error::CoordinatorError;
use crate::focus::CloseRequest;

impl Coordinator {
    pub(crate) async fn refresh_projection(&self, tab: &TabContext) -> Result<(), CoordinatorError> {
        let credentials = self.collaborators.credentials.credentials_for_tab(tab).await?;
        self.projection.replace(tab.id, credentials);
        Ok(())
    }

    /// Re-read the tab's credentials and push them to its list surface.
    ///
    /// Nothing is read while the vault is not unlocked.
    pub async fn update_inline_menu_ciphers(&self, tab: &TabContext) -> Result<(), CoordinatorError> {
        if !self.collaborators.auth.auth_status().await.is_unlocked() {
            return Ok(());
        }
        self.refresh_projection(tab).await?;

        if self.ports.lookup(tab.id, SurfaceKind::List).is_some() {
            let show_favicons = self.collaborators.settings.show_favicons().await;
            let credentials = self.projection.project(tab.id, show_favicons);
            self.post_to(
                tab.id,
                SurfaceKind::List,
                SurfaceCommand::UpdateAutofillInlineMenuListCiphers { credentials },
            );
        }
        Ok(())
    }

    /// The vault session changed.
    ///
    /// On unlock the focused tab's credentials are refreshed and every queued
    /// action is replayed. Otherwise decrypted credentials are forgotten.
    pub async fn auth_status_changed(&self, status: AuthStatus) {
        info!(?status, "Auth status changed");
        if !status.is_unlocked() {
            self.projection.clear();
            if let Some(field) = self.focus.focused() {
                self.post_to(
                    field.tab_id(),
                    SurfaceKind::List,
                    SurfaceCommand::UpdateAutofillInlineMenuListCiphers {
                        credentials: Vec::new(),
                    },
                );
            }
            return;
        }

        if let Some(field) = self.focus.focused() {
            if let Err(e) = self.update_inline_menu_ciphers(&field.tab).await {
                warn!(tab = %field.tab_id(), error = %e, "Credential refresh after unlock failed");
            }
        }

        let pending = mem::take(&mut *self.pending.lock());
        for (tab_id, (tab, actions)) in pending {
            for action in actions {
                let result = match action {
                    PendingAction::OpenInlineMenu => {
                        self.open_inline_menu(tab_id, true, true).await;
                        Ok(())
                    }
                    PendingAction::Fill { ephemeral_id } => {
                        self.replay_fill(&tab, &ephemeral_id).await
                    }
                };
                if let Err(e) = result {
                    warn!(tab = %tab_id, error = %e, "Queued action failed after unlock");
                }
            }
        }
    }

    async fn replay_fill(&self, tab: &TabContext, ephemeral_id: &str) -> Result<(), CoordinatorError> {
        if !self.projection.is_populated(tab.id) {
            self.refresh_projection(tab).await?;
        }
        self.fill_inline_menu_cipher(tab, ephemeral_id).await
    }

    /// The tab was closed. Everything held for it is dropped.
    pub fn tab_removed(&self, tab: TabId) {
        self.ports.remove_tab(tab);
        self.geometry.remove_tab(tab);
        self.page_details.remove_tab(tab);
        self.projection.remove_tab(tab);
        self.pending.lock().remove(&tab);
        if self.focus.clear_tab(tab) {
            self.pipeline.reposition.cancel();
            self.pipeline.cancel_settles();
        }
        info!(%tab, "Tab state released");
    }

    /// A frame navigated away. A top-frame navigation resets the whole page.
    pub async fn frame_navigated(&self, tab: TabId, frame: FrameId) {
        if frame.is_top() {
            self.geometry.remove_tab(tab);
            self.page_details.remove_tab(tab);
            if self.focus.is_focused_tab(tab) {
                self.close_inline_menu(
                    tab,
                    CloseRequest {
                        force: true,
                        element: None,
                    },
                )
                .await;
                self.focus.clear_tab(tab);
            }
            return;
        }

        self.geometry.remove_frame(tab, frame);
        self.page_details.remove_frame(tab, frame);
        if self.focus.clear_frame(tab, frame) {
            self.close_inline_menu(
                tab,
                CloseRequest {
                    force: true,
                    element: None,
                },
            )
            .await;
        }
    }
}
