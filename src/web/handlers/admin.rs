//! Permission administration.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::db::{Permission, PermissionRepository, UserRepository};
use crate::web::dto::{ApiResponse, PermissionRequest, PermissionsResponse};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, JwtClaims};

use super::AppState;

async fn require_admin(state: &AppState, claims: &JwtClaims) -> Result<(), ApiError> {
    let principal = state
        .principal(Some(claims))
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;
    if !(principal.user.is_active && principal.user.is_admin()) {
        return Err(ApiError::forbidden("Admin access required"));
    }
    Ok(())
}

async fn permissions_of(state: &AppState, user_id: i64) -> Result<PermissionsResponse, ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let repo = PermissionRepository::new(state.db.pool());

    let granted = repo
        .list_granted(user_id)
        .await?
        .iter()
        .map(|p| p.codename().to_string())
        .collect();
    let mut effective: Vec<String> = repo
        .effective_for(&user)
        .await?
        .iter()
        .map(|p| p.codename().to_string())
        .collect();
    effective.sort();

    Ok(PermissionsResponse {
        user_id,
        granted,
        effective,
    })
}

fn parse_permission(codename: &str) -> Result<Permission, ApiError> {
    codename
        .parse()
        .map_err(|_| ApiError::field("permission", format!("Unknown permission: {codename}")))
}

/// POST /api/admin/users/:id/permissions
pub async fn grant_permission(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<i64>,
    Json(req): Json<PermissionRequest>,
) -> Result<Json<ApiResponse<PermissionsResponse>>, ApiError> {
    require_admin(&state, &claims).await?;
    let permission = parse_permission(&req.permission)?;

    if UserRepository::new(state.db.pool())
        .get_by_id(user_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("User not found"));
    }

    PermissionRepository::new(state.db.pool())
        .grant(user_id, permission)
        .await?;
    tracing::info!(admin_id = claims.sub, user_id, %permission, "Permission granted");

    Ok(Json(ApiResponse::new(permissions_of(&state, user_id).await?)))
}

/// DELETE /api/admin/users/:id/permissions
pub async fn revoke_permission(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<i64>,
    Json(req): Json<PermissionRequest>,
) -> Result<Json<ApiResponse<PermissionsResponse>>, ApiError> {
    require_admin(&state, &claims).await?;
    let permission = parse_permission(&req.permission)?;

    let revoked = PermissionRepository::new(state.db.pool())
        .revoke(user_id, permission)
        .await?;
    if revoked {
        tracing::info!(admin_id = claims.sub, user_id, %permission, "Permission revoked");
    }

    Ok(Json(ApiResponse::new(permissions_of(&state, user_id).await?)))
}
