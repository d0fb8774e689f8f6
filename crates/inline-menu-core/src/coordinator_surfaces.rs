//! Surface connections and the signed messages surfaces send back.

use std::sync::Arc;

use tracing::{debug, info};

use inline_menu_protocols::{
    FillRequest, FocusDirection, FrameId, FrameRequest, InitSurface, PortId, PositionStyles,
    SurfaceCommand, SurfaceKind, SurfacePort, TabContext, TabId,
};

use crate::coordinator::{Coordinator, PendingAction};
use crate::error::CoordinatorError;
use crate::focus::CloseRequest;
use crate::ports::Released;

const BUTTON_TITLE_KEY: &str = "inlineMenuButtonTitle";
const LIST_TITLE_KEY: &str = "inlineMenuListTitle";

impl Coordinator {
    /// Register a newly connected surface, send its handshake and position it.
    pub async fn connect_surface(&self, port: Arc<dyn SurfacePort>) -> Result<(), CoordinatorError> {
        let kind = port.kind();
        let tab = port.sender().tab.clone();
        let registration = self.ports.register(Arc::clone(&port));

        let auth_status = self.collaborators.auth.auth_status().await;
        let theme = self.collaborators.settings.theme().await;
        let translations = self.collaborators.settings.translations().await;

        let credentials = match kind {
            SurfaceKind::List => {
                // A cached projection keeps the order of the last fill.
                if auth_status.is_unlocked() && !self.projection.is_populated(tab.id) {
                    self.refresh_projection(&tab).await?;
                }
                let show_favicons = self.collaborators.settings.show_favicons().await;
                Some(self.projection.project(tab.id, show_favicons))
            }
            SurfaceKind::Button => None,
        };

        let surfaces = &self.settings.surfaces;
        let (document_url, style_sheet_url, title_key, default_title) = match kind {
            SurfaceKind::Button => (
                &surfaces.button_url,
                &surfaces.style_sheet_url_button,
                BUTTON_TITLE_KEY,
                "Inline menu button",
            ),
            SurfaceKind::List => (
                &surfaces.list_url,
                &surfaces.style_sheet_url_list,
                LIST_TITLE_KEY,
                "Inline menu list",
            ),
        };
        let init = InitSurface {
            surface_document_url: document_url.clone(),
            surface_title: translations
                .get(title_key)
                .cloned()
                .unwrap_or_else(|| default_title.to_string()),
            auth_status,
            style_sheet_url: style_sheet_url.clone(),
            theme,
            translations,
            credentials,
            signing_key: registration.signing_key,
            reply_channel_name: kind.reply_channel_name().to_string(),
        };
        port.post(match kind {
            SurfaceKind::Button => SurfaceCommand::InitButton(init),
            SurfaceKind::List => SurfaceCommand::InitList(init),
        });

        self.position_surface(kind, tab.id, true).await;
        Ok(())
    }

    /// A surface closed its channel.
    pub fn surface_disconnected(&self, port: PortId) {
        match self.ports.port_disconnected(port) {
            Some(Released::Live { tab, kind }) => {
                info!(%tab, %kind, %port, "Surface disconnected");
                if self.focus.is_focused_tab(tab) {
                    self.focus.set_visible(kind, false);
                }
            }
            Some(Released::Expired { tab }) => {
                debug!(%tab, %port, "Expired surface disconnected");
            }
            None => {}
        }
    }

    /// The button was clicked: open the full menu, or ask for an unlock first.
    pub async fn inline_menu_button_clicked(&self, tab: &TabContext) -> Result<(), CoordinatorError> {
        if !self.collaborators.auth.auth_status().await.is_unlocked() {
            return self.unlock_vault(tab, PendingAction::OpenInlineMenu).await;
        }
        self.open_inline_menu(tab.id, false, true).await;
        Ok(())
    }

    /// The button lost focus; ask the list whether it took it.
    pub fn inline_menu_button_blurred(&self, tab: TabId) {
        self.post_to(tab, SurfaceKind::List, SurfaceCommand::CheckAutofillInlineMenuListFocused);
    }

    /// The list lost focus or asks about the button; ask the button whether it holds focus.
    pub fn check_inline_menu_button_focused(&self, tab: TabId) {
        self.post_to(
            tab,
            SurfaceKind::Button,
            SurfaceCommand::CheckAutofillInlineMenuButtonFocused,
        );
    }

    /// Move keyboard focus out of the surfaces back into the page.
    pub async fn redirect_focus_out(&self, tab: TabId, direction: FocusDirection) {
        let frame = self
            .focus
            .focused()
            .filter(|field| field.tab_id() == tab)
            .map(|field| field.frame_id)
            .unwrap_or(FrameId::TOP);
        self.notify_frame(
            tab,
            frame,
            FrameRequest::RedirectAutofillInlineMenuFocusOut { direction },
        )
        .await;
    }

    /// The button switched color scheme; the list follows.
    pub fn update_color_scheme(&self, tab: TabId) {
        self.post_to(tab, SurfaceKind::List, SurfaceCommand::UpdateAutofillInlineMenuColorScheme);
    }

    /// Close the menu, remember what the user wanted and open the unlock popout.
    pub async fn unlock_vault(
        &self,
        tab: &TabContext,
        action: PendingAction,
    ) -> Result<(), CoordinatorError> {
        self.close_inline_menu(
            tab.id,
            CloseRequest {
                force: true,
                element: None,
            },
        )
        .await;
        self.queue_action(tab, action);
        self.collaborators.popouts.open_unlock(tab).await?;
        Ok(())
    }

    /// Fill the page with the credential behind `ephemeral_id`.
    pub async fn fill_inline_menu_cipher(
        &self,
        tab: &TabContext,
        ephemeral_id: &str,
    ) -> Result<(), CoordinatorError> {
        if !self.collaborators.auth.auth_status().await.is_unlocked() {
            let action = PendingAction::Fill {
                ephemeral_id: ephemeral_id.to_string(),
            };
            return self.unlock_vault(tab, action).await;
        }

        let credential = self
            .projection
            .get(tab.id, ephemeral_id)
            .ok_or_else(|| CoordinatorError::UnknownCredential(ephemeral_id.to_string()))?;
        if self
            .collaborators
            .autofill
            .is_reprompt_required(&credential, tab)
            .await
        {
            debug!(tab = %tab.id, ephemeral_id, "Fill handed to password reprompt");
            self.collaborators
                .popouts
                .open_password_reprompt(tab, &credential.id)
                .await?;
            return Ok(());
        }

        let page_details = self.page_details.valid_frames(tab.id);
        if page_details.is_empty() {
            debug!(tab = %tab.id, "No page details to fill");
            return Ok(());
        }

        self.collaborators
            .autofill
            .fill(FillRequest {
                tab,
                credential: &credential,
                page_details,
            })
            .await?;
        self.projection.promote(tab.id, ephemeral_id);
        Ok(())
    }

    /// Open the vault item behind `ephemeral_id` in a popout.
    pub async fn view_selected_cipher(
        &self,
        tab: &TabContext,
        ephemeral_id: &str,
    ) -> Result<(), CoordinatorError> {
        let credential = self
            .projection
            .get(tab.id, ephemeral_id)
            .ok_or_else(|| CoordinatorError::UnknownCredential(ephemeral_id.to_string()))?;
        self.close_inline_menu(
            tab.id,
            CloseRequest {
                force: true,
                element: None,
            },
        )
        .await;
        self.collaborators
            .popouts
            .open_view_item(tab, &credential.id)
            .await?;
        Ok(())
    }

    /// The list measured its content; forward the new size to its frame.
    pub fn update_list_height(&self, tab: TabId, styles: PositionStyles) {
        self.post_to(
            tab,
            SurfaceKind::List,
            SurfaceCommand::UpdateAutofillInlineMenuPosition { styles },
        );
    }
}
