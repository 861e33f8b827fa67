//! Attempt log and per-user statistics.

use std::sync::Arc;

use axum::{extract::State, response::Redirect, Json};

use crate::mailing::{AttemptRepository, MailingRepository, StatisticsRepository};
use crate::web::dto::{
    to_responses, ApiResponse, AttemptListResponse, StatisticsResponse,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::mailing::ATTEMPT_LIST;
use super::AppState;

/// GET /attempts
pub async fn list_attempts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<AttemptListResponse>>, ApiError> {
    let attempts = AttemptRepository::new(state.db.pool()).list_all().await?;
    let repo = MailingRepository::new(state.db.pool());
    let mailings = state.cache.mailings(|| repo.list()).await?;

    Ok(Json(ApiResponse::new(AttemptListResponse {
        attempts: to_responses(&attempts),
        mailings: to_responses(mailings.as_slice()),
    })))
}

/// POST /attempts/clear
///
/// Deletes every attempt. Repeating the call is harmless.
pub async fn clear_attempts(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Redirect, ApiError> {
    state.active_principal(&claims).await?;
    let deleted = AttemptRepository::new(state.db.pool()).delete_all().await?;
    tracing::info!(deleted, by = claims.sub, "Attempt log cleared");
    Ok(Redirect::to(ATTEMPT_LIST))
}

/// GET /statistics
///
/// The row is created on first access.
pub async fn statistics(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<StatisticsResponse>>, ApiError> {
    state.active_principal(&claims).await?;

    let (stats, created) = StatisticsRepository::new(state.db.pool())
        .get_or_create(claims.sub)
        .await?;
    if created {
        tracing::debug!(user_id = claims.sub, "Statistics row created");
    }

    Ok(Json(ApiResponse::new(StatisticsResponse::from(&stats))))
}
