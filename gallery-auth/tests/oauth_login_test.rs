//! Flow-level tests for external-identity login. The provider exchange is
//! HTTP plumbing; the find-or-create-and-link semantics live in the flow and
//! are exercised directly here.

mod common;

use common::spawn_app;
use gallery_auth::services::{OAuthProfile, PrincipalRepository, ServiceError};

fn profile(external_id: &str, email: &str) -> OAuthProfile {
    OAuthProfile {
        external_id: external_id.to_string(),
        email: email.to_string(),
        name: Some("Ann".to_string()),
        avatar_url: Some("https://example.com/ann.png".to_string()),
    }
}

#[tokio::test]
async fn test_oauth_login_provisions_preverified_principal() {
    let test = spawn_app().await;

    let auth = test
        .state
        .auth_service
        .oauth_login(profile("gid-1", "ann@x.com"))
        .await
        .expect("oauth login");

    assert_eq!(auth.user.email, "ann@x.com");
    assert!(auth.user.email_verified);
    assert!(!auth.tokens.access_token.is_empty());

    let stored = test
        .users
        .find_by_email("ann@x.com")
        .await
        .unwrap()
        .expect("principal created");
    assert_eq!(stored.google_id.as_deref(), Some("gid-1"));
    // No password credential exists for a provider-created account
    assert!(stored.password_hash.is_none());
}

#[tokio::test]
async fn test_oauth_login_links_existing_email_principal() {
    let test = spawn_app().await;

    // A password-based account exists without linkage
    let register = test
        .state
        .auth_service
        .register(gallery_auth::dtos::auth::RegisterRequest {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: "Secret1Secret1".to_string(),
            confirm_password: "Secret1Secret1".to_string(),
        })
        .await
        .expect("register");
    let original_id = register.user.user_id;

    let auth = test
        .state
        .auth_service
        .oauth_login(profile("gid-9", "ann@x.com"))
        .await
        .expect("oauth login");

    // Reused, not duplicated
    assert_eq!(auth.user.user_id, original_id);

    let linked = test
        .users
        .find_by_google_id("gid-9")
        .await
        .unwrap()
        .expect("linked principal");
    assert_eq!(linked.user_id, original_id);
    // The password credential survives the linkage
    assert!(linked.password_hash.is_some());
}

#[tokio::test]
async fn test_oauth_linkage_is_never_overwritten() {
    let test = spawn_app().await;

    test.state
        .auth_service
        .oauth_login(profile("gid-first", "ann@x.com"))
        .await
        .expect("first login");

    // A second provider id for the same email leaves the linkage alone
    test.state
        .auth_service
        .oauth_login(profile("gid-second", "ann@x.com"))
        .await
        .expect("second login");

    let stored = test
        .users
        .find_by_email("ann@x.com")
        .await
        .unwrap()
        .expect("principal present");
    assert_eq!(stored.google_id.as_deref(), Some("gid-first"));
}

#[tokio::test]
async fn test_oauth_login_repeated_reuses_principal() {
    let test = spawn_app().await;

    let first = test
        .state
        .auth_service
        .oauth_login(profile("gid-5", "bob@x.com"))
        .await
        .expect("first login");

    let second = test
        .state
        .auth_service
        .oauth_login(profile("gid-5", "bob@x.com"))
        .await
        .expect("second login");

    assert_eq!(first.user.user_id, second.user.user_id);
}

#[tokio::test]
async fn test_oauth_login_inactive_account_forbidden() {
    let test = spawn_app().await;

    test.state
        .auth_service
        .oauth_login(profile("gid-7", "carl@x.com"))
        .await
        .expect("provision");

    let mut principal = test
        .users
        .find_by_email("carl@x.com")
        .await
        .unwrap()
        .unwrap();
    principal.active = false;
    test.users.save(&principal).await.unwrap();

    let result = test
        .state
        .auth_service
        .oauth_login(profile("gid-7", "carl@x.com"))
        .await;

    assert!(matches!(result, Err(ServiceError::AccountDisabled)));
}
