use std::io::Write;

use inline_menu_protocols::{LoginView, TabId};
use tempfile::NamedTempFile;

use super::*;

fn login(id: &str, uri: &str, favorite: bool) -> CredentialView {
    CredentialView {
        id: id.to_string(),
        name: id.to_string(),
        credential_type: CredentialType::Login,
        reprompt: false,
        favorite,
        login: Some(LoginView {
            username: None,
            uris: vec![uri.to_string()],
        }),
        card: None,
    }
}

fn card(id: &str) -> CredentialView {
    CredentialView {
        id: id.to_string(),
        name: id.to_string(),
        credential_type: CredentialType::Card,
        reprompt: false,
        favorite: false,
        login: None,
        card: None,
    }
}

fn tab(url: &str) -> TabContext {
    TabContext::new(TabId(1)).with_url(url)
}

#[test]
fn test_initial_auth_status() {
    let mut vault = VaultConfig::default();
    assert_eq!(initial_auth_status(&vault).unwrap(), AuthStatus::Unlocked);

    vault.auth_status = "loggedOut".to_string();
    assert_eq!(initial_auth_status(&vault).unwrap(), AuthStatus::LoggedOut);

    vault.auth_status = "asleep".to_string();
    assert!(matches!(
        initial_auth_status(&vault),
        Err(ConfigError::InvalidValue { ref field, .. }) if field == "vault.auth_status"
    ));
}

#[tokio::test]
async fn test_credentials_for_tab_filters_and_orders() {
    let provider = JsonCredentialProvider::new(vec![
        card("visa"),
        login("other", "https://other.test", false),
        login("plain", "https://example.com/login", false),
        login("starred", "example.com", true),
    ]);

    let ids: Vec<String> = provider
        .credentials_for_tab(&tab("https://accounts.example.com/signin"))
        .await
        .unwrap()
        .into_iter()
        .map(|credential| credential.id)
        .collect();
    assert_eq!(ids, vec!["starred", "plain", "visa"]);
}

#[tokio::test]
async fn test_tab_without_url_gets_no_logins() {
    let provider = JsonCredentialProvider::new(vec![login("plain", "https://example.com", false)]);
    let credentials = provider
        .credentials_for_tab(&TabContext::new(TabId(1)))
        .await
        .unwrap();
    assert!(credentials.is_empty());
}

#[test]
fn test_load_credentials_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"id":"a1","name":"Example","type":"login","login":{{"uris":["https://example.com"]}}}}]"#
    )
    .unwrap();

    let provider = JsonCredentialProvider::load(file.path()).unwrap();
    assert_eq!(provider.len(), 1);
}

#[test]
fn test_missing_credentials_file() {
    let result = JsonCredentialProvider::load(Path::new("/nonexistent/credentials.json"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[tokio::test]
async fn test_settings_come_from_appearance() {
    let settings = ConfiguredSettings::new(AppearanceConfig::default());
    assert_eq!(settings.theme().await, "light");
    assert!(settings.show_favicons().await);
}
