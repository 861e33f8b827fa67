//! Web API Admin Tests
//!
//! Integration tests for permission grants.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{bearer, create_test_app, grant, register_user};

#[tokio::test]
async fn test_grant_permission() {
    let app = create_test_app().await;
    let (admin_token, _) = register_user(&app.server, "admin").await;
    let (_, user_id) = register_user(&app.server, "operator").await;

    let response = app
        .server
        .post(&format!("/api/admin/users/{}/permissions", user_id))
        .add_header(AUTHORIZATION, bearer(&admin_token))
        .json(&json!({ "permission": "can_disable_mailings" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["user_id"], user_id);
    assert_eq!(body["data"]["granted"], json!(["can_disable_mailings"]));
    assert_eq!(body["data"]["effective"], json!(["can_disable_mailings"]));
}

#[tokio::test]
async fn test_granted_permission_visible_in_me() {
    let app = create_test_app().await;
    let (admin_token, _) = register_user(&app.server, "admin").await;
    let (user_token, user_id) = register_user(&app.server, "operator").await;

    grant(&app.server, &admin_token, user_id, "delete_mailing").await;

    let response = app
        .server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, bearer(&user_token))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["permissions"], json!(["delete_mailing"]));
}

#[tokio::test]
async fn test_revoke_permission() {
    let app = create_test_app().await;
    let (admin_token, _) = register_user(&app.server, "admin").await;
    let (_, user_id) = register_user(&app.server, "operator").await;

    grant(&app.server, &admin_token, user_id, "change_message").await;

    let response = app
        .server
        .delete(&format!("/api/admin/users/{}/permissions", user_id))
        .add_header(AUTHORIZATION, bearer(&admin_token))
        .json(&json!({ "permission": "change_message" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["granted"], json!([]));
}

#[tokio::test]
async fn test_grant_requires_admin() {
    let app = create_test_app().await;
    let (user_token, user_id) = register_user(&app.server, "operator").await;

    let response = app
        .server
        .post(&format!("/api/admin/users/{}/permissions", user_id))
        .add_header(AUTHORIZATION, bearer(&user_token))
        .json(&json!({ "permission": "can_disable_mailings" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_grant_requires_token() {
    let app = create_test_app().await;

    app.server
        .post("/api/admin/users/1/permissions")
        .json(&json!({ "permission": "can_disable_mailings" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_grant_unknown_permission() {
    let app = create_test_app().await;
    let (admin_token, admin_id) = register_user(&app.server, "admin").await;

    let response = app
        .server
        .post(&format!("/api/admin/users/{}/permissions", admin_id))
        .add_header(AUTHORIZATION, bearer(&admin_token))
        .json(&json!({ "permission": "launch_rockets" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["error"]["details"]["permission"].is_array());
}

#[tokio::test]
async fn test_grant_to_missing_user() {
    let app = create_test_app().await;
    let (admin_token, _) = register_user(&app.server, "admin").await;

    app.server
        .post("/api/admin/users/9999/permissions")
        .add_header(AUTHORIZATION, bearer(&admin_token))
        .json(&json!({ "permission": "delete_mailing" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
