//! Web API Attempt and Statistics Tests

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use serde_json::Value;

use common::{assert_redirect, bearer, create_test_app, register_user, seed_mailing};
use massmail::mailing::{AttemptRepository, StatisticsRepository};
use massmail::UserRepository;

#[tokio::test]
async fn test_attempt_list_includes_mailings() {
    let app = create_test_app().await;
    let (token, _) = register_user(&app.server, "alice").await;
    let id = seed_mailing(&app.db, &["one@example.com"], None).await;

    app.server
        .post(&format!("/mailing/{}/start", id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    let response = app.server.get("/attempts").await;
    response.assert_status_ok();
    let body: Value = response.json();
    let attempts = body["data"]["attempts"].as_array().unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0]["mailing_id"], id);
    assert_eq!(attempts[0]["status"], "success");
    assert_eq!(body["data"]["mailings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_clear_attempts_twice() {
    let app = create_test_app().await;
    let (token, _) = register_user(&app.server, "alice").await;
    let id = seed_mailing(
        &app.db,
        &["one@example.com", "two@example.com", "three@example.com"],
        None,
    )
    .await;
    app.server
        .post(&format!("/mailing/{}/start", id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    let repo = AttemptRepository::new(app.db.pool());
    assert_eq!(repo.count().await.unwrap(), 3);

    for _ in 0..2 {
        let response = app
            .server
            .post("/attempts/clear")
            .add_header(AUTHORIZATION, bearer(&token))
            .await;
        assert_redirect(&response, "/attempts");
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}

#[tokio::test]
async fn test_clear_attempts_requires_login() {
    let app = create_test_app().await;

    app.server
        .post("/attempts/clear")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_statistics_get_or_create() {
    let app = create_test_app().await;
    let (token, user_id) = register_user(&app.server, "alice").await;

    let first: Value = app
        .server
        .get("/statistics")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(first["data"]["user_id"], user_id);
    assert_eq!(first["data"]["total_attempts"], 0);
    assert_eq!(first["data"]["messages_sent"], 0);

    let second: Value = app
        .server
        .get("/statistics")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(first, second);

    let (_, created) = StatisticsRepository::new(app.db.pool())
        .get_or_create(user_id)
        .await
        .unwrap();
    assert!(!created);
}

#[tokio::test]
async fn test_statistics_after_start() {
    let app = create_test_app().await;
    let (token, _) = register_user(&app.server, "alice").await;
    let id = seed_mailing(&app.db, &["one@example.com", "two@example.com"], None).await;
    app.transport.reject("two@example.com").await;

    app.server
        .post(&format!("/mailing/{}/start", id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    let body: Value = app
        .server
        .get("/statistics")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(body["data"]["total_attempts"], 2);
    assert_eq!(body["data"]["successful_attempts"], 1);
    assert_eq!(body["data"]["failed_attempts"], 1);
    assert_eq!(body["data"]["messages_sent"], 1);
}

#[tokio::test]
async fn test_statistics_requires_login() {
    let app = create_test_app().await;

    app.server
        .get("/statistics")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_clear_attempts_inactive_account() {
    let app = create_test_app().await;
    let (token, _) = register_user(&app.server, "alice").await;
    let (stale_token, stale_id) = register_user(&app.server, "bob").await;
    let id = seed_mailing(&app.db, &["one@example.com"], None).await;
    app.server
        .post(&format!("/mailing/{}/start", id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    UserRepository::new(app.db.pool())
        .set_active(stale_id, false)
        .await
        .unwrap();

    app.server
        .post("/attempts/clear")
        .add_header(AUTHORIZATION, bearer(&stale_token))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    assert_eq!(AttemptRepository::new(app.db.pool()).count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_statistics_deleted_user() {
    let app = create_test_app().await;
    let (token, user_id) = register_user(&app.server, "alice").await;
    UserRepository::new(app.db.pool())
        .delete(user_id)
        .await
        .unwrap();

    app.server
        .get("/statistics")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
