//! Session lifecycle against the mock pizza service.

#![allow(clippy::unwrap_used)]

use jwt_pizza_client::{NavItem, PizzaError, Storefront, TokenFile};
use jwt_pizza_integration_tests::{LOGIN_TOKEN, MockPizzaService, REGISTER_TOKEN};
use secrecy::SecretString;

fn password(p: &str) -> SecretString {
    SecretString::from(p)
}

fn labels(storefront: &Storefront) -> Vec<String> {
    storefront
        .navigation()
        .iter()
        .map(|item| item.label().to_string())
        .collect()
}

fn scratch_file(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("jwt-pizza-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    path
}

#[tokio::test]
async fn test_login_shows_initials() {
    let mock = MockPizzaService::start().await.unwrap();
    let mut storefront = mock.storefront().unwrap();
    assert_eq!(labels(&storefront), ["Order", "Franchise", "Login", "Register"]);

    let user = storefront.login("d@jwt.com", &password("a")).await.unwrap();
    assert_eq!(user.name, "Kai Chen");
    assert_eq!(user.initials(), "KC");

    assert_eq!(storefront.session().token().unwrap().expose(), LOGIN_TOKEN);
    assert_eq!(labels(&storefront), ["Order", "Franchise", "Logout", "KC"]);
}

#[tokio::test]
async fn test_bad_password_is_unauthorized() {
    let mock = MockPizzaService::start().await.unwrap();
    let mut storefront = mock.storefront().unwrap();

    let err = storefront.login("d@jwt.com", &password("b")).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!storefront.session().is_logged_in());
}

#[tokio::test]
async fn test_logout_returns_to_login_links() {
    let mock = MockPizzaService::start().await.unwrap();
    let mut storefront = mock.storefront().unwrap();
    storefront.login("d@jwt.com", &password("a")).await.unwrap();

    storefront.logout().await.unwrap();

    assert!(!storefront.session().is_logged_in());
    assert!(storefront.navigation().contains(&NavItem::Login));
    assert!(storefront.navigation().contains(&NavItem::Register));
}

#[tokio::test]
async fn test_failed_logout_still_clears_local_session() {
    let mock = MockPizzaService::start().await.unwrap();
    let mut storefront = mock.storefront().unwrap();
    storefront.login("d@jwt.com", &password("a")).await.unwrap();
    mock.fail_logout().await;

    let err = storefront.logout().await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
    assert!(!storefront.session().is_logged_in());
}

#[tokio::test]
async fn test_register_new_diner() {
    let mock = MockPizzaService::start().await.unwrap();
    let mut storefront = mock.storefront().unwrap();

    let user = storefront
        .register("New User", "new@jwt.com", &password("mypassword"))
        .await
        .unwrap();
    assert_eq!(user.initials(), "NU");
    assert_eq!(storefront.session().token().unwrap().expose(), REGISTER_TOKEN);
    assert!(storefront.session().roles().unwrap().has(jwt_pizza_core::RoleKind::Diner));
}

#[tokio::test]
async fn test_register_existing_email_conflicts() {
    let mock = MockPizzaService::start().await.unwrap();
    let mut storefront = mock.storefront().unwrap();

    let err = storefront
        .register("Kai Chen", "d@jwt.com", &password("a"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert!(matches!(&err, PizzaError::Api { message, .. } if message == "User already exists"));
    assert!(!storefront.session().is_logged_in());
}

#[tokio::test]
async fn test_session_survives_restart_through_token_file() {
    let mock = MockPizzaService::start().await.unwrap();
    let path = scratch_file("restore.json");

    let mut first = mock
        .storefront()
        .unwrap()
        .with_token_file(TokenFile::new(&path));
    first.login("f@jwt.com", &password("a")).await.unwrap();
    drop(first);

    let mut second = mock
        .storefront()
        .unwrap()
        .with_token_file(TokenFile::new(&path));
    let user = second.restore().await.unwrap().unwrap();
    assert_eq!(user.name, "Fran Chise");
    assert!(second.session().is_logged_in());
}

#[tokio::test]
async fn test_revoked_token_is_forgotten_on_restore() {
    let mock = MockPizzaService::start().await.unwrap();
    let path = scratch_file("revoked.json");

    let mut first = mock
        .storefront()
        .unwrap()
        .with_token_file(TokenFile::new(&path));
    first.login("d@jwt.com", &password("a")).await.unwrap();
    mock.revoke_tokens().await;

    let mut second = mock
        .storefront()
        .unwrap()
        .with_token_file(TokenFile::new(&path));
    assert!(second.restore().await.unwrap().is_none());
    assert!(!second.session().is_logged_in());
    assert!(TokenFile::new(&path).load().unwrap().is_none());
}

#[tokio::test]
async fn test_logout_ends_server_session_when_token_file_is_stuck() {
    let mock = MockPizzaService::start().await.unwrap();
    let path = scratch_file("stuck.json");

    let mut storefront = mock
        .storefront()
        .unwrap()
        .with_token_file(TokenFile::new(&path));
    storefront.login("d@jwt.com", &password("a")).await.unwrap();
    let token = storefront.session().token().cloned().unwrap();

    // A non-empty directory where the file was cannot be removed
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir_all(path.join("occupied")).unwrap();

    let err = storefront.logout().await.unwrap_err();
    assert!(matches!(err, PizzaError::Storage(_)));
    assert!(!storefront.session().is_logged_in());

    let mut other = mock.storefront().unwrap();
    assert!(other.restore_token(token).await.unwrap().is_none());

    std::fs::remove_dir_all(&path).unwrap();
}

#[tokio::test]
async fn test_logged_out_token_restores_nobody() {
    let mock = MockPizzaService::start().await.unwrap();
    let mut storefront = mock.storefront().unwrap();
    storefront.login("d@jwt.com", &password("a")).await.unwrap();
    let token = storefront.session().token().cloned().unwrap();
    storefront.logout().await.unwrap();

    let mut other = mock.storefront().unwrap();
    assert!(other.restore_token(token).await.unwrap().is_none());
    assert!(!other.session().is_logged_in());
}

#[tokio::test]
async fn test_update_profile_replaces_user_and_token() {
    let mock = MockPizzaService::start().await.unwrap();
    let mut storefront = mock.storefront().unwrap();
    storefront.login("d@jwt.com", &password("a")).await.unwrap();

    let user = storefront
        .update_profile("Kai Chang", "kai@jwt.com", None)
        .await
        .unwrap();
    assert_eq!(user.initials(), "KC");
    assert_eq!(user.email.as_str(), "kai@jwt.com");
    assert_eq!(storefront.session().token().unwrap().expose(), "updated-3");

    storefront.logout().await.unwrap();
    storefront.login("kai@jwt.com", &password("a")).await.unwrap();
}
