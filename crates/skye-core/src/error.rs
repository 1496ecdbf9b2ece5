//! Error types for skye.

use crate::ids::IdError;

/// Result type for skye operations.
pub type Result<T> = std::result::Result<T, SkyeError>;

/// Errors that can occur in ledger and dispatch operations.
#[derive(Debug, thiserror::Error)]
pub enum SkyeError {
    /// Bad or missing caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The rendered prompt leaves no room for a completion.
    #[error("prompt too long: estimated {estimated} tokens, limit {limit}")]
    PromptTooLong {
        /// Estimated prompt tokens.
        estimated: i64,
        /// Context window size.
        limit: i64,
    },

    /// No template is registered under this model name.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// The model exists but the user may not use it.
    #[error("model not available to this user: {0}")]
    ModelNotEntitled(String),

    /// No user owns this invitation code.
    #[error("illegal invitation code: {0}")]
    IllegalInvitationCode(String),

    /// Redeem code does not exist.
    #[error("wrong redeem code: {0}")]
    WrongCode(String),

    /// Redeem code was already redeemed.
    #[error("redeem code already used: {0}")]
    CodeAlreadyUsed(String),

    /// A user with this identity already exists.
    #[error("user already exists: {0}")]
    UserExists(String),

    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Not enough credit for a paid operation.
    #[error("insufficient balance: available={available}")]
    InsufficientBalance {
        /// Credit available at the time of the check.
        available: i64,
    },

    /// The remote completion API failed or rejected the request.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}

/// Coarse classification of [`SkyeError`] used at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing input.
    Validation,
    /// Something referenced by the caller does not exist.
    NotFound,
    /// The caller is not entitled to the resource.
    Forbidden,
    /// Duplicate identity or already-consumed resource.
    Conflict,
    /// Not enough credit.
    InsufficientBalance,
    /// Remote completion API failure.
    Upstream,
    /// Anything else.
    Internal,
}

impl SkyeError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::PromptTooLong { .. } | Self::InvalidId(_) => {
                ErrorKind::Validation
            }
            Self::UnknownModel(_)
            | Self::IllegalInvitationCode(_)
            | Self::WrongCode(_)
            | Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::ModelNotEntitled(_) => ErrorKind::Forbidden,
            Self::CodeAlreadyUsed(_) | Self::UserExists(_) => ErrorKind::Conflict,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::Upstream(_) => ErrorKind::Upstream,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_are_distinguishable() {
        assert_eq!(
            SkyeError::UnknownModel("x".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            SkyeError::ModelNotEntitled("general".into()).kind(),
            ErrorKind::Forbidden
        );
    }

    #[test]
    fn redemption_errors() {
        assert_eq!(SkyeError::WrongCode("c".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            SkyeError::CodeAlreadyUsed("c".into()).kind(),
            ErrorKind::Conflict
        );
    }
}
