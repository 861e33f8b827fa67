//! Router configuration.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    block_mailing, clear_attempts, create_mailing, create_message, create_recipient,
    delete_mailing, delete_message, delete_recipient, get_mailing, get_message, get_recipient,
    grant_permission, home, list_attempts, list_mailings, list_messages, list_recipients, login,
    me, register, revoke_permission, show_block, show_mailing, start_mailing, statistics,
    update_mailing, update_message, update_recipient, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// Create the application router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/me", get(me));

    let admin_routes = Router::new().route(
        "/users/:id/permissions",
        post(grant_permission).delete(revoke_permission),
    );

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes);

    let mailing_routes = Router::new()
        .route("/", get(list_mailings))
        .route("/create", post(create_mailing))
        .route("/:id", get(get_mailing))
        .route("/:id/update", post(update_mailing))
        .route("/:id/delete", post(delete_mailing))
        .route("/:id/start", get(show_mailing).post(start_mailing))
        .route("/:id/block", get(show_block).post(block_mailing));

    let message_routes = Router::new()
        .route("/", get(list_messages))
        .route("/create", post(create_message))
        .route("/:id", get(get_message))
        .route("/:id/update", post(update_message))
        .route("/:id/delete", post(delete_message));

    let recipient_routes = Router::new()
        .route("/", get(list_recipients))
        .route("/create", post(create_recipient))
        .route("/:id", get(get_recipient))
        .route("/:id/update", post(update_recipient))
        .route("/:id/delete", post(delete_recipient));

    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .route("/", get(home))
        .nest("/mailing", mailing_routes)
        .nest("/message", message_routes)
        .nest("/recipient", recipient_routes)
        .route("/attempts", get(list_attempts))
        .route("/attempts/clear", post(clear_attempts))
        .route("/statistics", get(statistics))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
