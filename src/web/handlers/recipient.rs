//! Recipient handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};

use crate::auth::allowed;
use crate::cache::ListingKind;
use crate::db::Permission;
use crate::recipient::{NewRecipient, Recipient, RecipientRepository, RecipientUpdate};
use crate::web::dto::{
    to_responses, ApiResponse, RecipientForm, RecipientResponse, ValidatedForm,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

use super::AppState;

/// Recipient list view.
pub const RECIPIENT_LIST: &str = "/recipient";

async fn load_recipient(state: &AppState, id: i64) -> Result<Recipient, ApiError> {
    RecipientRepository::new(state.db.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipient not found"))
}

fn invalidate(state: &AppState) {
    state.cache.invalidate(ListingKind::Recipients);
    state.cache.invalidate(ListingKind::Mailings);
}

/// GET /recipient
pub async fn list_recipients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<RecipientResponse>>>, ApiError> {
    let repo = RecipientRepository::new(state.db.pool());
    let recipients = state.cache.recipients(|| repo.list()).await?;
    Ok(Json(ApiResponse::new(to_responses(recipients.as_slice()))))
}

/// GET /recipient/:id
pub async fn get_recipient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RecipientResponse>>, ApiError> {
    let recipient = load_recipient(&state, id).await?;
    Ok(Json(ApiResponse::new(RecipientResponse::from(&recipient))))
}

/// POST /recipient/create
pub async fn create_recipient(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedForm(form): ValidatedForm<RecipientForm>,
) -> Result<Redirect, ApiError> {
    state.active_principal(&claims).await?;
    let new_recipient = NewRecipient::new(form.email.trim(), form.full_name.trim())
        .with_comment(form.comment)
        .with_owner(claims.sub);
    let recipient = RecipientRepository::new(state.db.pool())
        .create(&new_recipient)
        .await?;
    invalidate(&state);

    tracing::info!(recipient_id = recipient.id, owner_id = claims.sub, "Recipient created");
    Ok(Redirect::to(RECIPIENT_LIST))
}

/// POST /recipient/:id/update
pub async fn update_recipient(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(claims): OptionalAuthUser,
    Path(id): Path<i64>,
    ValidatedForm(form): ValidatedForm<RecipientForm>,
) -> Result<Redirect, ApiError> {
    let recipient = load_recipient(&state, id).await?;
    let principal = state.principal(claims.as_ref()).await?;
    if !allowed(principal.as_ref(), recipient.owner_id, Permission::ChangeRecipient) {
        tracing::info!(recipient_id = id, "Recipient update denied");
        return Ok(Redirect::to(RECIPIENT_LIST));
    }

    let update = RecipientUpdate {
        email: Some(form.email.trim().to_string()),
        full_name: Some(form.full_name.trim().to_string()),
        comment: Some(form.comment),
    };
    RecipientRepository::new(state.db.pool())
        .update(id, &update)
        .await?;
    invalidate(&state);

    tracing::info!(recipient_id = id, "Recipient updated");
    Ok(Redirect::to(RECIPIENT_LIST))
}

/// POST /recipient/:id/delete
///
/// The recipient is removed from every mailing.
pub async fn delete_recipient(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(claims): OptionalAuthUser,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    let recipient = load_recipient(&state, id).await?;
    let principal = state.principal(claims.as_ref()).await?;
    if !allowed(principal.as_ref(), recipient.owner_id, Permission::DeleteRecipient) {
        tracing::info!(recipient_id = id, "Recipient delete denied");
        return Ok(Redirect::to(RECIPIENT_LIST));
    }

    RecipientRepository::new(state.db.pool()).delete(id).await?;
    invalidate(&state);

    tracing::info!(recipient_id = id, "Recipient deleted");
    Ok(Redirect::to(RECIPIENT_LIST))
}
