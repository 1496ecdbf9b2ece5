//! Registration, login and current-user handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use skye_core::NewUser;

use crate::auth::{issue_token, AuthUser};
use crate::crypto::{hash_password_blocking, verify_password_blocking};
use crate::error::ApiError;
use crate::handlers::{data, Envelope};
use crate::state::AppState;

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Invitation code of the inviter.
    pub invitation_code: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::InvalidParams("name is required".into()));
        }
        if !self.email.contains('@') {
            return Err(ApiError::InvalidParams("email is invalid".into()));
        }
        if self.password.is_empty() {
            return Err(ApiError::InvalidParams("password is required".into()));
        }
        Ok(())
    }
}

/// Register a new user under an inviter.
///
/// Grants the registration bonus to the new user and to the inviter.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    req.validate()?;

    let password_hash = hash_password_blocking(req.password, state.config.password_hash_cost)
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    let new_user = NewUser {
        email: req.email,
        password_hash,
        name: req.name,
    };
    state.ledger.register(new_user, &req.invitation_code).await?;

    Ok(StatusCode::OK)
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer session token.
    pub token: String,
}

/// Exchange credentials for a session token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Envelope<LoginResponse>>, ApiError> {
    let user = state
        .store
        .get_user_by_email(&req.email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let matches = verify_password_blocking(req.password, user.password_hash.clone())
        .await
        .map_err(|e| ApiError::Internal(format!("password check failed: {e}")))?;
    if !matches {
        tracing::debug!(user_id = %user.id, "Login with wrong password");
        return Err(ApiError::Unauthorized);
    }

    let token = issue_token(
        &user.id,
        &state.config.jwt_secret,
        Duration::from_secs(state.config.session_ttl_seconds),
    )
    .map_err(|e| ApiError::Internal(format!("token encoding failed: {e}")))?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(data(LoginResponse { token }))
}

/// Logout. Tokens are stateless; the client discards its copy.
pub async fn logout() -> StatusCode {
    StatusCode::OK
}

/// Current user response.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// VIP flag.
    pub vip: bool,
}

/// Get the current user.
pub async fn current_user(auth: AuthUser) -> Json<Envelope<UserResponse>> {
    let user = auth.user;
    data(UserResponse {
        name: user.name,
        email: user.email,
        vip: user.is_vip,
    })
}
