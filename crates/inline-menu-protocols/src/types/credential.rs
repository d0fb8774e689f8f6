//! Credential views consumed from the vault collaborator and the wire-safe
//! projection sent to the list surface.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;

/// Kind of vault item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CredentialType {
    Login,
    SecureNote,
    Card,
    Identity,
}

/// Login-specific fields of a decrypted credential.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub uris: Vec<String>,
}

/// Card-specific fields of a decrypted credential.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub last4: Option<String>,
}

impl CardView {
    /// Short description shown under the card name, e.g. `Visa, *4242`.
    pub fn sub_title(&self) -> Option<String> {
        match (self.brand.as_deref(), self.last4.as_deref()) {
            (Some(brand), Some(last4)) => Some(format!("{}, *{}", brand, last4)),
            (Some(brand), None) => Some(brand.to_string()),
            (None, Some(last4)) => Some(format!("*{}", last4)),
            (None, None) => None,
        }
    }
}

/// Decrypted credential as handed over by the vault collaborator.
///
/// The coordinator treats it as opaque except for the fields it projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialView {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub credential_type: CredentialType,
    #[serde(default)]
    pub reprompt: bool,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub login: Option<LoginView>,
    #[serde(default)]
    pub card: Option<CardView>,
}

/// Icon descriptor for a projected credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconRef {
    pub image_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Icon class used when the image is disabled or fails to load.
    pub icon: String,
}

/// Login hint shown in the list surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginHint {
    pub username: Option<String>,
}

/// Wire-safe projection of a credential for the list surface.
///
/// `ephemeral_id` is session scoped and never equals the vault identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProjectionEntry {
    pub ephemeral_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub credential_type: CredentialType,
    pub reprompt_required: bool,
    pub favorite: bool,
    pub icon_ref: IconRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_hint: Option<LoginHint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_hint: Option<String>,
}
