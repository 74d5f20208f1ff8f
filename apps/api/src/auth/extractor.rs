use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;
use uuid::Uuid;

use crate::auth::crypto::decode_token;
use crate::errors::AppError;
use crate::state::AppState;

/// Legacy header some clients send instead of `Authorization: Bearer`.
const TOKEN_HEADER: &str = "x-auth-token";

/// The account a request is authenticated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = request_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let claims = decode_token(token, &state.config.jwt_secret).map_err(|e| {
            debug!("Rejected token: {e}");
            AppError::Unauthorized
        })?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;
        Ok(AuthUser { user_id })
    }
}

fn request_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        return value.to_str().ok()?.strip_prefix("Bearer ").map(str::trim);
    }
    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
