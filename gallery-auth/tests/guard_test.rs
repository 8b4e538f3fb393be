mod common;

use axum::{body::Body, http::Request, http::StatusCode};
use common::{bearer_request, json_request, read_json, spawn_app};
use gallery_auth::models::Role;
use gallery_auth::services::PrincipalRepository;
use serde_json::json;
use tower::util::ServiceExt;

async fn register_and_login(test: &common::TestApp, email: &str) -> (String, String) {
    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/register",
            json!({
                "name": "Guard Test",
                "email": email,
                "password": "Secret1Secret1",
                "confirm_password": "Secret1Secret1"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    (
        body["user"]["user_id"].as_str().unwrap().to_string(),
        body["tokens"]["access_token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_missing_bearer_token_unauthorized() {
    let test = spawn_app().await;

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/users/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_unauthorized() {
    let test = spawn_app().await;

    let response = test
        .app
        .clone()
        .oneshot(bearer_request("GET", "/users/me", "not-a-jwt", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_cannot_pass_the_guard() {
    let test = spawn_app().await;
    let (_user_id, _access) = register_and_login(&test, "guard1@x.com").await;

    let refresh = test
        .state
        .jwt
        .issue_refresh_token("00000000-0000-0000-0000-000000000000")
        .unwrap();

    let response = test
        .app
        .clone()
        .oneshot(bearer_request("GET", "/users/me", &refresh, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_reaches_profile() {
    let test = spawn_app().await;
    let (user_id, access) = register_and_login(&test, "guard2@x.com").await;

    let response = test
        .app
        .clone()
        .oneshot(bearer_request("GET", "/users/me", &access, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["user_id"], user_id.as_str());
    assert_eq!(body["email"], "guard2@x.com");
}

#[tokio::test]
async fn test_profile_of_other_user_requires_owner_or_admin() {
    let test = spawn_app().await;
    let (owner_id, _owner_token) = register_and_login(&test, "owner@x.com").await;
    let (_other_id, other_token) = register_and_login(&test, "stranger@x.com").await;

    // A stranger may not read someone else's profile
    let forbidden = test
        .app
        .clone()
        .oneshot(bearer_request(
            "GET",
            &format!("/users/{}", owner_id),
            &other_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    // An admin may
    let mut admin = test
        .users
        .find_by_email("stranger@x.com")
        .await
        .unwrap()
        .unwrap();
    admin.role_code = Role::Admin.as_str().to_string();
    test.users.save(&admin).await.unwrap();

    let admin_login = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({ "email": "stranger@x.com", "password": "Secret1Secret1" }),
        ))
        .await
        .unwrap();
    let admin_tokens = read_json(admin_login).await;
    let admin_token = admin_tokens["access_token"].as_str().unwrap();

    let allowed = test
        .app
        .clone()
        .oneshot(bearer_request(
            "GET",
            &format!("/users/{}", owner_id),
            admin_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_endpoints_role_gate() {
    let test = spawn_app().await;
    let (user_id, user_token) = register_and_login(&test, "plain@x.com").await;

    // An ordinary user is rejected
    let forbidden = test
        .app
        .clone()
        .oneshot(bearer_request(
            "PATCH",
            &format!("/auth/admin/users/{}/state", user_id),
            &user_token,
            Some(json!({ "active": false })),
        ))
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    // Promote a second account to admin and deactivate the first
    let (_admin_id, _token) = register_and_login(&test, "root@x.com").await;
    let mut admin = test
        .users
        .find_by_email("root@x.com")
        .await
        .unwrap()
        .unwrap();
    admin.role_code = Role::Admin.as_str().to_string();
    test.users.save(&admin).await.unwrap();

    let admin_login = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({ "email": "root@x.com", "password": "Secret1Secret1" }),
        ))
        .await
        .unwrap();
    let admin_tokens = read_json(admin_login).await;
    let admin_token = admin_tokens["access_token"].as_str().unwrap();

    let updated = test
        .app
        .clone()
        .oneshot(bearer_request(
            "PATCH",
            &format!("/auth/admin/users/{}/state", user_id),
            admin_token,
            Some(json!({ "active": false })),
        ))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    let body = read_json(updated).await;
    assert_eq!(body["active"], false);

    // The deactivated account can no longer log in
    let login = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({ "email": "plain@x.com", "password": "Secret1Secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::FORBIDDEN);

    // Admin read endpoint is gated the same way
    let admin_get = test
        .app
        .clone()
        .oneshot(bearer_request(
            "GET",
            &format!("/auth/admin/users/{}", user_id),
            admin_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(admin_get.status(), StatusCode::OK);

    let user_get = test
        .app
        .clone()
        .oneshot(bearer_request(
            "GET",
            &format!("/auth/admin/users/{}", user_id),
            &user_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(user_get.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health_check_is_public() {
    let test = spawn_app().await;

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");
}
