//! Command router: decodes inbound messages and dispatches them to the
//! coordinator.
//!
//! Frame messages are unsigned and may produce a reply. Surface messages must
//! carry their tab's signing key and never reply. Unknown commands, bad keys,
//! handler errors and handler panics all end here: they are logged and the
//! caller sees no reply.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::{json, Value};
use tracing::{debug, warn};

use inline_menu_protocols::{
    split_signing_key, ButtonPortMessage, FrameMessage, ListPortMessage, MessageSender,
    ProtocolError, SurfaceKind, SurfacePort,
};

use crate::coordinator::{Coordinator, PendingAction};
use crate::error::CoordinatorError;
use crate::focus::CloseRequest;

#[derive(Clone)]
pub struct CommandRouter {
    coordinator: Arc<Coordinator>,
}

fn decode<T: serde::de::DeserializeOwned>(message: Value) -> Result<T, ProtocolError> {
    if message.get("command").and_then(Value::as_str).is_none() {
        return Err(ProtocolError::MissingCommand);
    }
    Ok(serde_json::from_value(message)?)
}

/// Run a handler, turning errors and panics into "no reply".
async fn guarded<F>(command: &'static str, handler: F) -> Option<Value>
where
    F: Future<Output = Result<Option<Value>, CoordinatorError>>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => {
            warn!(command, error = %e, "Handler failed");
            None
        }
        Err(_) => {
            warn!(command, "Handler panicked");
            None
        }
    }
}

impl CommandRouter {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// Handle one request from a page frame. Returns the reply, if any.
    pub async fn route_frame(&self, message: Value, sender: MessageSender) -> Option<Value> {
        let message: FrameMessage = match decode(message) {
            Ok(message) => message,
            Err(e) => {
                debug!(tab = %sender.tab_id(), frame = %sender.frame_id, error = %e, "Dropping frame message");
                return None;
            }
        };
        if message == FrameMessage::Unknown {
            debug!(tab = %sender.tab_id(), "Dropping unknown frame command");
            return None;
        }

        let command = message.command_name();
        guarded(command, self.dispatch_frame(message, &sender)).await
    }

    async fn dispatch_frame(
        &self,
        message: FrameMessage,
        sender: &MessageSender,
    ) -> Result<Option<Value>, CoordinatorError> {
        let coordinator = &self.coordinator;
        let tab = sender.tab_id();
        match message {
            FrameMessage::CollectPageDetailsResponse { details } => {
                coordinator.collect_page_details(details, sender).await;
            }
            FrameMessage::UpdateFocusedFieldData { focused_field_data } => {
                coordinator
                    .update_focused_field_data(focused_field_data, sender)
                    .await?;
            }
            FrameMessage::UpdateIsFieldCurrentlyFocused {
                is_field_currently_focused,
            } => coordinator.update_is_field_currently_focused(is_field_currently_focused),
            FrameMessage::UpdateIsFieldCurrentlyFilling {
                is_field_currently_filling,
            } => coordinator.update_is_field_currently_filling(is_field_currently_filling),
            FrameMessage::CheckIsFieldCurrentlyFocused => {
                return Ok(Some(json!(coordinator.check_is_field_currently_focused())));
            }
            FrameMessage::CheckIsFieldCurrentlyFilling => {
                return Ok(Some(json!(coordinator.check_is_field_currently_filling())));
            }
            FrameMessage::UpdateSubFrameData { sub_frame_data } => {
                coordinator.update_sub_frame_data(sub_frame_data, sender);
            }
            FrameMessage::TriggerAutofillOverlayReposition => coordinator.trigger_reposition(sender),
            FrameMessage::TriggerSubFrameFocusInRebuild => {
                coordinator.trigger_sub_frame_focus_in_rebuild(sender);
            }
            FrameMessage::DestroyAutofillInlineMenuListeners { sub_frame_data } => {
                coordinator
                    .destroy_inline_menu_listeners(sub_frame_data, sender)
                    .await;
            }
            FrameMessage::CheckIsAutofillInlineMenuButtonVisible => {
                return Ok(Some(json!(coordinator.check_is_surface_visible(SurfaceKind::Button))));
            }
            FrameMessage::CheckIsAutofillInlineMenuListVisible => {
                return Ok(Some(json!(coordinator.check_is_surface_visible(SurfaceKind::List))));
            }
            FrameMessage::CheckIsInlineMenuCiphersPopulated => {
                return Ok(Some(json!(coordinator.check_is_inline_menu_ciphers_populated(sender))));
            }
            FrameMessage::OpenAutofillInlineMenu {
                is_opening_full_inline_menu,
            } => {
                coordinator
                    .open_inline_menu(tab, false, is_opening_full_inline_menu)
                    .await;
            }
            FrameMessage::CloseAutofillInlineMenu {
                overlay_element,
                force_close_inline_menu,
            } => {
                let request = CloseRequest {
                    force: force_close_inline_menu,
                    element: overlay_element,
                };
                coordinator.close_inline_menu(tab, request).await;
            }
            FrameMessage::AutofillOverlayElementClosed { overlay_element } => {
                coordinator.overlay_element_closed(overlay_element, sender);
            }
            FrameMessage::UpdateAutofillInlineMenuPosition { overlay_element } => {
                coordinator
                    .update_inline_menu_position(overlay_element, tab)
                    .await;
            }
            FrameMessage::ToggleAutofillInlineMenuHidden {
                is_inline_menu_hidden,
                set_transparent_inline_menu,
            } => coordinator.toggle_hidden(tab, is_inline_menu_hidden, set_transparent_inline_menu),
            FrameMessage::UpdateAutofillInlineMenuElementIsVisibleStatus {
                overlay_element,
                is_visible,
            } => coordinator.update_element_is_visible_status(overlay_element, is_visible, sender),
            FrameMessage::CheckAutofillInlineMenuFocused => {
                coordinator.check_inline_menu_focused(sender);
            }
            FrameMessage::FocusAutofillInlineMenuList => coordinator.focus_inline_menu_list(sender),
            FrameMessage::Unknown => {}
        }
        Ok(None)
    }

    /// Handle one message arriving on a surface port.
    pub async fn route_surface(&self, port: &Arc<dyn SurfacePort>, message: Value) {
        let (key, message) = split_signing_key(message);
        let tab = port.sender().tab_id();
        let kind = port.kind();

        match kind {
            SurfaceKind::Button => {
                let message: ButtonPortMessage = match decode(message) {
                    Ok(ButtonPortMessage::Unknown) | Err(_) => {
                        debug!(%tab, %kind, "Dropping unknown surface command");
                        return;
                    }
                    Ok(message) => message,
                };
                if !self.verify(port, key.as_deref()) {
                    return;
                }
                guarded(
                    "buttonPortMessage",
                    self.dispatch_button(message, port),
                )
                .await;
            }
            SurfaceKind::List => {
                let message: ListPortMessage = match decode(message) {
                    Ok(ListPortMessage::Unknown) | Err(_) => {
                        debug!(%tab, %kind, "Dropping unknown surface command");
                        return;
                    }
                    Ok(message) => message,
                };
                if !self.verify(port, key.as_deref()) {
                    return;
                }
                guarded("listPortMessage", self.dispatch_list(message, port)).await;
            }
        }
    }

    fn verify(&self, port: &Arc<dyn SurfacePort>, key: Option<&str>) -> bool {
        let tab = port.sender().tab_id();
        if self.coordinator.ports().verify(tab, key) {
            return true;
        }
        let error = ProtocolError::SigningKeyRejected(tab.to_string());
        debug!(port = %port.id(), error = %error, "Dropping surface message");
        false
    }

    async fn dispatch_button(
        &self,
        message: ButtonPortMessage,
        port: &Arc<dyn SurfacePort>,
    ) -> Result<Option<Value>, CoordinatorError> {
        let coordinator = &self.coordinator;
        let tab = &port.sender().tab;
        match message {
            ButtonPortMessage::AutofillInlineMenuButtonClicked => {
                coordinator.inline_menu_button_clicked(tab).await?;
            }
            ButtonPortMessage::AutofillInlineMenuBlurred => {
                coordinator.inline_menu_button_blurred(tab.id);
            }
            ButtonPortMessage::RedirectAutofillInlineMenuFocusOut { direction } => {
                coordinator.redirect_focus_out(tab.id, direction).await;
            }
            ButtonPortMessage::UpdateAutofillInlineMenuColorScheme => {
                coordinator.update_color_scheme(tab.id);
            }
            ButtonPortMessage::Unknown => {}
        }
        Ok(None)
    }

    async fn dispatch_list(
        &self,
        message: ListPortMessage,
        port: &Arc<dyn SurfacePort>,
    ) -> Result<Option<Value>, CoordinatorError> {
        let coordinator = &self.coordinator;
        let tab = &port.sender().tab;
        match message {
            ListPortMessage::CheckAutofillInlineMenuButtonFocused
            | ListPortMessage::AutofillInlineMenuBlurred => {
                coordinator.check_inline_menu_button_focused(tab.id);
            }
            ListPortMessage::UnlockVault => {
                coordinator
                    .unlock_vault(tab, PendingAction::OpenInlineMenu)
                    .await?;
            }
            ListPortMessage::FillAutofillInlineMenuCipher {
                inline_menu_cipher_id,
            } => {
                coordinator
                    .fill_inline_menu_cipher(tab, &inline_menu_cipher_id)
                    .await?;
            }
            ListPortMessage::ViewSelectedCipher {
                inline_menu_cipher_id,
            } => {
                coordinator
                    .view_selected_cipher(tab, &inline_menu_cipher_id)
                    .await?;
            }
            ListPortMessage::RedirectAutofillInlineMenuFocusOut { direction } => {
                coordinator.redirect_focus_out(tab.id, direction).await;
            }
            ListPortMessage::UpdateAutofillInlineMenuListHeight { styles } => {
                coordinator.update_list_height(tab.id, styles);
            }
            ListPortMessage::Unknown => {}
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_requires_command() {
        let result = decode::<FrameMessage>(json!({ "details": {} }));
        assert!(matches!(result, Err(ProtocolError::MissingCommand)));
    }

    #[test]
    fn test_decode_unknown_command() {
        let message = decode::<FrameMessage>(json!({ "command": "launchRockets" })).unwrap();
        assert_eq!(message, FrameMessage::Unknown);
    }

    #[test]
    fn test_decode_malformed_payload() {
        let result = decode::<FrameMessage>(json!({
            "command": "updateIsFieldCurrentlyFocused",
            "isFieldCurrentlyFocused": "yes",
        }));
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_guarded_swallows_errors_and_panics() {
        let reply = guarded("ok", async { Ok(Some(json!(true))) }).await;
        assert_eq!(reply, Some(json!(true)));

        let reply = guarded("failing", async {
            Err(CoordinatorError::UnknownCredential("inline-menu-cipher-3".to_string()))
        })
        .await;
        assert_eq!(reply, None);

        let reply = guarded("panicking", async {
            if true {
                panic!("handler bug");
            }
            Ok(None)
        })
        .await;
        assert_eq!(reply, None);
    }
}
