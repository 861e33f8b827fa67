//! Mailing handlers.
//!
//! Writes answer with a 303 redirect. Update and delete fall back to the
//! list without changes when the caller is neither the owner nor holds the
//! matching permission.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use axum_extra::extract::Form;

use crate::auth::{allowed, require};
use crate::cache::ListingKind;
use crate::db::Permission;
use crate::mailing::{
    AttemptRepository, Mailing, MailingRepository, MailingService, MailingUpdate, NewMailing,
};
use crate::message::MessageRepository;
use crate::recipient::RecipientRepository;
use crate::web::dto::{
    to_responses, ApiResponse, BlockForm, MailingDetailResponse, MailingForm, MailingResponse,
    ValidatedForm,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

use super::AppState;

/// Mailing list view.
pub const MAILING_LIST: &str = "/mailing";
/// Attempt list view.
pub const ATTEMPT_LIST: &str = "/attempts";

async fn load_mailing(state: &AppState, id: i64) -> Result<Mailing, ApiError> {
    MailingRepository::new(state.db.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Mailing not found"))
}

/// Check that the form refers to an existing message and existing recipients.
async fn check_references(state: &AppState, form: &MailingForm) -> Result<(), ApiError> {
    if MessageRepository::new(state.db.pool())
        .get_by_id(form.message_id)
        .await?
        .is_none()
    {
        return Err(ApiError::field(
            "message_id",
            format!("Unknown message: {}", form.message_id),
        ));
    }

    let missing = RecipientRepository::new(state.db.pool())
        .missing_ids(&form.recipients)
        .await?;
    if let Some(id) = missing.first() {
        return Err(ApiError::field("recipients", format!("Unknown recipient: {id}")));
    }
    Ok(())
}

/// GET /mailing
pub async fn list_mailings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<MailingResponse>>>, ApiError> {
    let repo = MailingRepository::new(state.db.pool());
    let mailings = state.cache.mailings(|| repo.list()).await?;
    Ok(Json(ApiResponse::new(to_responses(mailings.as_slice()))))
}

/// GET /mailing/:id
pub async fn get_mailing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MailingDetailResponse>>, ApiError> {
    let mailing = load_mailing(&state, id).await?;
    let message = MessageRepository::new(state.db.pool())
        .get_by_id(mailing.message_id)
        .await?;
    let recipients = MailingRepository::new(state.db.pool()).recipients(id).await?;
    let attempts = AttemptRepository::new(state.db.pool())
        .list_by_mailing(id)
        .await?;

    Ok(Json(ApiResponse::new(MailingDetailResponse {
        mailing: MailingResponse::from(&mailing),
        message: message.as_ref().map(Into::into),
        recipients: to_responses(&recipients),
        attempts: to_responses(&attempts),
    })))
}

/// POST /mailing/create
pub async fn create_mailing(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedForm(form): ValidatedForm<MailingForm>,
) -> Result<Redirect, ApiError> {
    state.active_principal(&claims).await?;
    let (start_at, end_at) = form.schedule()?;
    check_references(&state, &form).await?;

    let mailing = MailingRepository::new(state.db.pool())
        .create(&NewMailing {
            start_at,
            end_at,
            message_id: form.message_id,
            recipient_ids: form.recipients,
            owner_id: Some(claims.sub),
        })
        .await?;
    state.cache.invalidate(ListingKind::Mailings);

    tracing::info!(mailing_id = mailing.id, owner_id = claims.sub, "Mailing created");
    Ok(Redirect::to(MAILING_LIST))
}

/// POST /mailing/:id/update
pub async fn update_mailing(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(claims): OptionalAuthUser,
    Path(id): Path<i64>,
    ValidatedForm(form): ValidatedForm<MailingForm>,
) -> Result<Redirect, ApiError> {
    let mailing = load_mailing(&state, id).await?;
    let principal = state.principal(claims.as_ref()).await?;
    if !allowed(principal.as_ref(), mailing.owner_id, Permission::ChangeMailing) {
        tracing::info!(mailing_id = id, "Mailing update denied");
        return Ok(Redirect::to(MAILING_LIST));
    }

    let (start_at, end_at) = form.schedule()?;
    check_references(&state, &form).await?;

    let update = MailingUpdate {
        start_at: Some(start_at),
        end_at: Some(end_at),
        message_id: Some(form.message_id),
        recipient_ids: Some(form.recipients),
    };
    MailingRepository::new(state.db.pool())
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("Mailing not found"))?;
    state.cache.invalidate(ListingKind::Mailings);

    tracing::info!(mailing_id = id, "Mailing updated");
    Ok(Redirect::to(MAILING_LIST))
}

/// POST /mailing/:id/delete
pub async fn delete_mailing(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(claims): OptionalAuthUser,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    let mailing = load_mailing(&state, id).await?;
    let principal = state.principal(claims.as_ref()).await?;
    if !allowed(principal.as_ref(), mailing.owner_id, Permission::DeleteMailing) {
        tracing::info!(mailing_id = id, "Mailing delete denied");
        return Ok(Redirect::to(MAILING_LIST));
    }

    MailingRepository::new(state.db.pool()).delete(id).await?;
    state.cache.invalidate(ListingKind::Mailings);

    tracing::info!(mailing_id = id, "Mailing deleted");
    Ok(Redirect::to(MAILING_LIST))
}

/// GET /mailing/:id/start
pub async fn show_mailing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MailingResponse>>, ApiError> {
    let mailing = load_mailing(&state, id).await?;
    Ok(Json(ApiResponse::new(MailingResponse::from(&mailing))))
}

/// GET /mailing/:id/block
pub async fn show_block(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MailingResponse>>, ApiError> {
    state.active_principal(&claims).await?;
    let mailing = load_mailing(&state, id).await?;
    Ok(Json(ApiResponse::new(MailingResponse::from(&mailing))))
}

/// POST /mailing/:id/start
///
/// Sends synchronously, then redirects to the attempt log.
pub async fn start_mailing(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    state.active_principal(&claims).await?;
    let service = MailingService::new(
        state.db.pool(),
        state.transport.as_ref(),
        &state.from_address,
    );
    let report = service.send_mailing(id, Some(claims.sub)).await?;
    state.cache.invalidate(ListingKind::Mailings);

    tracing::info!(
        mailing_id = id,
        succeeded = report.succeeded,
        failed = report.failed,
        "Mailing started"
    );
    Ok(Redirect::to(ATTEMPT_LIST))
}

/// POST /mailing/:id/block
pub async fn block_mailing(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Form(form): Form<BlockForm>,
) -> Result<Redirect, ApiError> {
    let principal = state.active_principal(&claims).await?;
    require(Some(&principal), Permission::DisableMailings)?;
    load_mailing(&state, id).await?;

    let blocked = form.checked();
    MailingRepository::new(state.db.pool())
        .set_blocked(id, blocked)
        .await?;
    state.cache.invalidate(ListingKind::Mailings);

    tracing::info!(mailing_id = id, blocked, by = claims.sub, "Mailing block changed");
    Ok(Redirect::to(MAILING_LIST))
}
