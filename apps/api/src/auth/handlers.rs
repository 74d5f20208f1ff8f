use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::crypto::{hash_password, issue_token, verify_password};
use crate::auth::extractor::AuthUser;
use crate::auth::store::{create_user, find_user_by_email, find_user_by_id, update_profile};
use crate::errors::AppError;
use crate::models::user::UserProfile;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    let email = normalize_email(&req.email)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))?;

    let user = create_user(&state.db, name, &email, &password_hash).await?;
    let token = token_for(&state, user.id)?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let invalid = || AppError::Validation("Invalid credentials".to_string());

    let email = normalize_email(&req.email).map_err(|_| invalid())?;
    let user = find_user_by_email(&state.db, &email)
        .await?
        .ok_or_else(invalid)?;

    let password = req.password;
    let stored = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored password hash is invalid: {e}")))?;
    if !matches {
        return Err(invalid());
    }

    Ok(Json(TokenResponse {
        token: token_for(&state, user.id)?,
    }))
}

/// GET /api/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let user = find_user_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user.into()))
}

/// PUT /api/auth/update
///
/// Blank fields are left unchanged.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let email = match req.email.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(raw) => Some(normalize_email(raw)?),
        None => None,
    };

    let user = update_profile(&state.db, auth.user_id, name, email.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user.into()))
}

fn token_for(state: &AppState, user_id: Uuid) -> Result<String, AppError> {
    issue_token(
        user_id,
        &state.config.jwt_secret,
        state.config.jwt_ttl_minutes,
    )
    .map_err(|e| AppError::Internal(e.into()))
}

/// Emails are matched case-insensitively, so they are stored lowercased.
fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::Validation("a valid email is required".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(
            normalize_email("  Ada@Example.COM ").unwrap(),
            "ada@example.com"
        );
    }

    #[test]
    fn test_malformed_emails_are_rejected() {
        for raw in ["", "ada", "@example.com", "ada@localhost"] {
            assert!(normalize_email(raw).is_err(), "{raw} was accepted");
        }
    }
}
