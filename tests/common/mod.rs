//! Test helpers for the HTTP API tests.
//!
//! Builds the router over an in-memory database with a [`MemoryTransport`]
//! so tests can inspect what was sent.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};

use massmail::mailing::{MailingRepository, NewMailing};
use massmail::message::{MessageRepository, NewMessage};
use massmail::recipient::{NewRecipient, RecipientRepository};
use massmail::web::handlers::AppState;
use massmail::web::middleware::JwtState;
use massmail::web::router::create_router;
use massmail::{Database, MemoryTransport};

pub const JWT_SECRET: &str = "test-secret-key-for-testing-only";
pub const PASSWORD: &str = "password123";
pub const FROM_ADDRESS: &str = "campaigns@example.com";

/// Server plus direct handles on its database and transport.
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<Database>,
    pub transport: Arc<MemoryTransport>,
}

/// Create a test app. Registering as `admin` yields the admin role.
pub async fn create_test_app() -> TestApp {
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );
    let transport = Arc::new(MemoryTransport::new());

    let app_state = Arc::new(
        AppState::new(db.clone(), JWT_SECRET, 900)
            .with_transport(transport.clone(), FROM_ADDRESS)
            .with_admin_usernames(&["admin".to_string()]),
    );
    let jwt_state = Arc::new(JwtState::new(JWT_SECRET));

    let router = create_router(app_state, jwt_state, &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db,
        transport,
    }
}

/// `Authorization` header value for a token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Register a user and return `(access_token, user_id)`.
pub async fn register_user(server: &TestServer, username: &str) -> (String, i64) {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "password": PASSWORD,
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let token = body["data"]["access_token"].as_str().unwrap().to_string();
    let id = body["data"]["user"]["id"].as_i64().unwrap();
    (token, id)
}

/// Grant a permission through the admin endpoint.
pub async fn grant(server: &TestServer, admin_token: &str, user_id: i64, permission: &str) {
    server
        .post(&format!("/api/admin/users/{}/permissions", user_id))
        .add_header(axum::http::header::AUTHORIZATION, bearer(admin_token))
        .json(&json!({ "permission": permission }))
        .await
        .assert_status_ok();
}

/// Assert a 303 redirect to `location`.
pub fn assert_redirect(response: &TestResponse, location: &str) {
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), location);
}

pub async fn seed_message(db: &Database, owner_id: Option<i64>) -> i64 {
    let mut message = NewMessage::new("Spring sale", "Everything is 20% off this week.");
    if let Some(owner_id) = owner_id {
        message = message.with_owner(owner_id);
    }
    MessageRepository::new(db.pool())
        .create(&message)
        .await
        .unwrap()
        .id
}

pub async fn seed_recipient(db: &Database, email: &str, owner_id: Option<i64>) -> i64 {
    let mut recipient = NewRecipient::new(email, "Test Recipient");
    if let Some(owner_id) = owner_id {
        recipient = recipient.with_owner(owner_id);
    }
    RecipientRepository::new(db.pool())
        .create(&recipient)
        .await
        .unwrap()
        .id
}

/// Seed a mailing with one message and the given recipient addresses.
pub async fn seed_mailing(db: &Database, emails: &[&str], owner_id: Option<i64>) -> i64 {
    let message_id = seed_message(db, owner_id).await;
    let mut recipient_ids = Vec::new();
    for email in emails {
        recipient_ids.push(seed_recipient(db, email, owner_id).await);
    }

    MailingRepository::new(db.pool())
        .create(&NewMailing {
            start_at: "2024-01-01 09:00:00".to_string(),
            end_at: None,
            message_id,
            recipient_ids,
            owner_id,
        })
        .await
        .unwrap()
        .id
}
