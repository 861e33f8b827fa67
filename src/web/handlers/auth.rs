//! Application state and authentication handlers.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{extract::State, Json};
use jsonwebtoken::{encode, EncodingKey, Header};

use crate::auth::{hash_password, validate_password, verify_password, PolicyError, Principal};
use crate::cache::ListingCache;
use crate::db::{NewUser, Permission, PermissionRepository, Role, User, UserRepository};
use crate::mailing::{LogTransport, MailTransport};
use crate::web::dto::{
    ApiResponse, LoginRequest, LoginResponse, MeResponse, RegisterRequest, UserInfo,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, JwtClaims};
use crate::Database;

/// Application state shared across handlers.
pub struct AppState {
    pub db: Arc<Database>,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
    pub cache: ListingCache,
    pub transport: Arc<dyn MailTransport>,
    /// Sender address for outgoing mail.
    pub from_address: String,
    /// Usernames promoted to admin on registration.
    pub admin_usernames: HashSet<String>,
}

impl AppState {
    /// Create a new application state with the log transport and a 15 minute cache.
    pub fn new(db: Arc<Database>, jwt_secret: &str, access_expiry: u64) -> Self {
        Self {
            db,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_expiry: access_expiry,
            cache: ListingCache::default(),
            transport: Arc::new(LogTransport),
            from_address: "noreply@localhost".to_string(),
            admin_usernames: HashSet::new(),
        }
    }

    /// Set the listing cache TTL.
    pub fn with_cache_ttl(mut self, ttl_secs: u64) -> Self {
        self.cache = ListingCache::new(ttl_secs);
        self
    }

    /// Set the mail transport and sender address.
    pub fn with_transport(
        mut self,
        transport: Arc<dyn MailTransport>,
        from_address: impl Into<String>,
    ) -> Self {
        self.transport = transport;
        self.from_address = from_address.into();
        self
    }

    /// Set the usernames that become admins on registration (case-insensitive).
    pub fn with_admin_usernames(mut self, usernames: &[String]) -> Self {
        self.admin_usernames = usernames.iter().map(|u| u.to_lowercase()).collect();
        self
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user: &User) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role.to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }

    /// Resolve token claims to a principal. Tokens of deleted users resolve to `None`.
    pub async fn principal(&self, claims: Option<&JwtClaims>) -> Result<Option<Principal>, ApiError> {
        match claims {
            Some(claims) => Ok(Principal::load(self.db.pool(), claims.sub).await?),
            None => Ok(None),
        }
    }

    /// Resolve token claims for a login-only action.
    ///
    /// A deleted user is rejected with 401, a deactivated one with 403.
    pub async fn active_principal(&self, claims: &JwtClaims) -> Result<Principal, ApiError> {
        let principal = self
            .principal(Some(claims))
            .await?
            .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;
        if !principal.user.is_active {
            return Err(PolicyError::AccountInactive.into());
        }
        Ok(principal)
    }

    fn login_response(&self, user: &User) -> Result<LoginResponse, ApiError> {
        Ok(LoginResponse {
            access_token: self.generate_access_token(user)?,
            token_type: "Bearer",
            expires_in: self.access_token_expiry,
            user: UserInfo::from(user),
        })
    }
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .get_by_username(&req.username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    verify_password(&req.password, &user.password)
        .map_err(|_| ApiError::unauthorized("Invalid username or password"))?;

    if !user.is_active {
        return Err(ApiError::forbidden("Account is disabled"));
    }

    if let Err(e) = repo.update_last_login(user.id).await {
        tracing::warn!(user_id = user.id, "Failed to update last login: {}", e);
    }

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(ApiResponse::new(state.login_response(&user)?)))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    validate_password(&req.password).map_err(|e| ApiError::field("password", e.to_string()))?;

    let repo = UserRepository::new(state.db.pool());
    if repo.username_exists(&req.username).await? {
        return Err(ApiError::conflict("Username already exists"));
    }

    let password_hash =
        hash_password(&req.password).map_err(|_| ApiError::internal("Failed to hash password"))?;

    let role = if state.admin_usernames.contains(&req.username.to_lowercase()) {
        Role::Admin
    } else {
        Role::User
    };

    let mut new_user = NewUser::new(&req.username, password_hash).with_role(role);
    if let Some(ref email) = req.email {
        new_user = new_user.with_email(email);
    }
    let user = repo.create(&new_user).await?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");
    Ok(Json(ApiResponse::new(state.login_response(&user)?)))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    let mut permissions: Vec<String> = PermissionRepository::new(state.db.pool())
        .effective_for(&user)
        .await?
        .into_iter()
        .map(|p: Permission| p.codename().to_string())
        .collect();
    permissions.sort();

    Ok(Json(ApiResponse::new(MeResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role.to_string(),
        permissions,
        created_at: user.created_at,
        last_login_at: user.last_login,
    })))
}
