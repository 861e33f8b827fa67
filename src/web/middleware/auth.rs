//! JWT authentication.
//!
//! The [`jwt_auth`] middleware puts the decoding state into request
//! extensions; the extractors read it from there.

use std::sync::Arc;

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::web::error::ApiError;

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User ID.
    pub sub: i64,
    pub username: String,
    pub role: String,
    /// Issued at (unix seconds).
    pub iat: u64,
    /// Expiry (unix seconds).
    pub exp: u64,
    /// Token ID.
    pub jti: String,
}

/// Key and validation settings for decoding tokens.
#[derive(Clone)]
pub struct JwtState {
    pub decoding_key: DecodingKey,
    pub validation: Validation,
}

impl JwtState {
    /// Create a new JWT state from a secret key.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    fn decode(&self, token: &str) -> Option<JwtClaims> {
        match decode::<JwtClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("JWT validation failed: {}", e);
                None
            }
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Extractor that requires a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub JwtClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

        let jwt_state = parts
            .extensions
            .get::<Arc<JwtState>>()
            .ok_or_else(|| ApiError::internal("JWT state not configured"))?;

        jwt_state
            .decode(token)
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))
    }
}

/// Extractor that accepts anonymous requests.
///
/// A missing or invalid token yields `None` instead of a rejection.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<JwtClaims>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = match (bearer_token(parts), parts.extensions.get::<Arc<JwtState>>()) {
            (Some(token), Some(jwt_state)) => jwt_state.decode(token),
            _ => None,
        };
        Ok(OptionalAuthUser(claims))
    }
}

/// Inject the JWT state into request extensions.
pub async fn jwt_auth(jwt_state: Arc<JwtState>, mut request: Request<Body>, next: Next) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn claims(exp_offset: i64) -> JwtClaims {
        let now = chrono::Utc::now().timestamp();
        JwtClaims {
            sub: 1,
            username: "alice".to_string(),
            role: "user".to_string(),
            iat: now as u64,
            exp: (now + exp_offset) as u64,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    fn token(secret: &str, claims: &JwtClaims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_valid_token() {
        let state = JwtState::new("test-secret");
        let decoded = state.decode(&token("test-secret", &claims(3600))).unwrap();
        assert_eq!(decoded.sub, 1);
        assert_eq!(decoded.username, "alice");
    }

    #[test]
    fn test_expired_token_rejected() {
        let state = JwtState::new("test-secret");
        assert!(state.decode(&token("test-secret", &claims(-3600))).is_none());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let state = JwtState::new("other-secret");
        assert!(state.decode(&token("test-secret", &claims(3600))).is_none());
    }
}
