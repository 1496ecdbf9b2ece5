//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use skye_core::SkyeError;
use skye_store::StoreError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// No user owns the invitation code.
    #[error("illegal invitation code")]
    IllegalInvitationCode,

    /// Email already registered.
    #[error("user already exists")]
    UserExists,

    /// Unknown model, or a model the caller may not use.
    #[error("wrong model: {0}")]
    WrongModel(String),

    /// Not enough credit.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Redeem code does not exist.
    #[error("wrong redeem code")]
    WrongCode,

    /// Redeem code already consumed.
    #[error("redeem code already used")]
    CodeUsed,

    /// Bad request - invalid input.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal server error, including completion API failures.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Machine-readable tag returned in the `error` field.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::IllegalInvitationCode => "illegal_invitation_code",
            Self::UserExists => "user_exists",
            Self::WrongModel(_) => "wrong_model",
            Self::InsufficientBalance => "insufficient_balance",
            Self::WrongCode => "wrong_code",
            Self::CodeUsed => "code_used",
            Self::InvalidParams(_) => "invalid_params",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "skye_internal_error",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::IllegalInvitationCode => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UserExists => StatusCode::CONFLICT,
            Self::WrongModel(_)
            | Self::InsufficientBalance
            | Self::WrongCode
            | Self::CodeUsed
            | Self::InvalidParams(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: self.tag(),
            message,
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<SkyeError> for ApiError {
    fn from(err: SkyeError) -> Self {
        match err {
            SkyeError::Validation(_) | SkyeError::PromptTooLong { .. } | SkyeError::InvalidId(_) => {
                Self::InvalidParams(err.to_string())
            }
            SkyeError::UnknownModel(model) => {
                tracing::warn!(model = %model, "Unknown model requested");
                Self::WrongModel(model)
            }
            SkyeError::ModelNotEntitled(model) => {
                tracing::warn!(model = %model, "Model requested without entitlement");
                Self::WrongModel(model)
            }
            SkyeError::IllegalInvitationCode(_) => Self::IllegalInvitationCode,
            SkyeError::UserExists(_) => Self::UserExists,
            SkyeError::WrongCode(_) => Self::WrongCode,
            SkyeError::CodeAlreadyUsed(_) => Self::CodeUsed,
            SkyeError::UserNotFound(msg) => Self::NotFound(msg),
            SkyeError::InsufficientBalance { available } => {
                tracing::debug!(available, "Insufficient balance");
                Self::InsufficientBalance
            }
            SkyeError::Upstream(msg) => Self::Internal(format!("completion API: {msg}")),
            SkyeError::Storage(msg) => Self::Internal(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        SkyeError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_share_a_tag() {
        let unknown = ApiError::from(SkyeError::UnknownModel("x".into()));
        let denied = ApiError::from(SkyeError::ModelNotEntitled("general".into()));
        assert_eq!(unknown.tag(), "wrong_model");
        assert_eq!(denied.tag(), "wrong_model");
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn registration_statuses() {
        let illegal = ApiError::from(SkyeError::IllegalInvitationCode("X".into()));
        assert_eq!(illegal.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let exists = ApiError::from(SkyeError::UserExists("a@b".into()));
        assert_eq!(exists.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn upstream_failures_are_internal() {
        let err = ApiError::from(SkyeError::Upstream("timeout".into()));
        assert_eq!(err.tag(), "skye_internal_error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn prompt_too_long_is_invalid_params() {
        let err = ApiError::from(SkyeError::PromptTooLong {
            estimated: 5000,
            limit: 4096,
        });
        assert_eq!(err.tag(), "invalid_params");
    }
}
