//! Message handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};

use crate::auth::allowed;
use crate::cache::ListingKind;
use crate::db::Permission;
use crate::message::{Message, MessageRepository, MessageUpdate, NewMessage};
use crate::web::dto::{to_responses, ApiResponse, MessageForm, MessageResponse, ValidatedForm};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

use super::AppState;

/// Message list view.
pub const MESSAGE_LIST: &str = "/message";

async fn load_message(state: &AppState, id: i64) -> Result<Message, ApiError> {
    MessageRepository::new(state.db.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Message not found"))
}

/// Mailings embed their message, so message writes drop both listings.
fn invalidate(state: &AppState) {
    state.cache.invalidate(ListingKind::Messages);
    state.cache.invalidate(ListingKind::Mailings);
}

/// GET /message
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<MessageResponse>>>, ApiError> {
    let repo = MessageRepository::new(state.db.pool());
    let messages = state.cache.messages(|| repo.list()).await?;
    Ok(Json(ApiResponse::new(to_responses(messages.as_slice()))))
}

/// GET /message/:id
pub async fn get_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let message = load_message(&state, id).await?;
    Ok(Json(ApiResponse::new(MessageResponse::from(&message))))
}

/// POST /message/create
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedForm(form): ValidatedForm<MessageForm>,
) -> Result<Redirect, ApiError> {
    state.active_principal(&claims).await?;
    let message = MessageRepository::new(state.db.pool())
        .create(&NewMessage::new(form.subject.trim(), form.body).with_owner(claims.sub))
        .await?;
    invalidate(&state);

    tracing::info!(message_id = message.id, owner_id = claims.sub, "Message created");
    Ok(Redirect::to(MESSAGE_LIST))
}

/// POST /message/:id/update
pub async fn update_message(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(claims): OptionalAuthUser,
    Path(id): Path<i64>,
    ValidatedForm(form): ValidatedForm<MessageForm>,
) -> Result<Redirect, ApiError> {
    let message = load_message(&state, id).await?;
    let principal = state.principal(claims.as_ref()).await?;
    if !allowed(principal.as_ref(), message.owner_id, Permission::ChangeMessage) {
        tracing::info!(message_id = id, "Message update denied");
        return Ok(Redirect::to(MESSAGE_LIST));
    }

    MessageRepository::new(state.db.pool())
        .update(
            id,
            &MessageUpdate::new()
                .subject(form.subject.trim())
                .body(form.body),
        )
        .await?;
    invalidate(&state);

    tracing::info!(message_id = id, "Message updated");
    Ok(Redirect::to(MESSAGE_LIST))
}

/// POST /message/:id/delete
///
/// Mailings that use the message are deleted with it.
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(claims): OptionalAuthUser,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    let message = load_message(&state, id).await?;
    let principal = state.principal(claims.as_ref()).await?;
    if !allowed(principal.as_ref(), message.owner_id, Permission::DeleteMessage) {
        tracing::info!(message_id = id, "Message delete denied");
        return Ok(Redirect::to(MESSAGE_LIST));
    }

    MessageRepository::new(state.db.pool()).delete(id).await?;
    invalidate(&state);

    tracing::info!(message_id = id, "Message deleted");
    Ok(Redirect::to(MESSAGE_LIST))
}
