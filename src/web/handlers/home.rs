//! Home page.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::mailing::{MailingRepository, MailingStatus};
use crate::recipient::RecipientRepository;
use crate::web::dto::{ApiResponse, HomeResponse};
use crate::web::error::ApiError;

use super::AppState;

/// GET /
///
/// Recipients are counted by distinct address (case-insensitive), so two
/// entries for the same mailbox count once.
pub async fn home(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HomeResponse>>, ApiError> {
    let mailings = MailingRepository::new(state.db.pool());

    Ok(Json(ApiResponse::new(HomeResponse {
        mailings_total: mailings.count().await?,
        mailings_started: mailings.count_by_status(MailingStatus::Started).await?,
        unique_recipient_emails: RecipientRepository::new(state.db.pool())
            .count_unique_emails()
            .await?,
    })))
}
