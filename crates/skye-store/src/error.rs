//! Error types for skye storage.

use skye_core::SkyeError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("not found")]
    NotFound,

    /// A user with this email already exists.
    #[error("duplicate email: {email}")]
    DuplicateEmail {
        /// The email that was duplicated.
        email: String,
    },

    /// The invitation code is already owned by another user.
    #[error("duplicate invitation code: {code}")]
    DuplicateInvitationCode {
        /// The colliding code.
        code: String,
    },

    /// Redeem code does not exist.
    #[error("unknown redeem code: {code}")]
    UnknownCode {
        /// The submitted code.
        code: String,
    },

    /// Redeem code was already redeemed.
    #[error("redeem code already redeemed: {code}")]
    CodeAlreadyRedeemed {
        /// The submitted code.
        code: String,
    },

    /// A unique value could not be generated.
    #[error("exhausted attempts generating a unique {0}")]
    Exhausted(&'static str),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        Self::Database(format!("migration failed: {e}"))
    }
}

impl From<StoreError> for SkyeError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => Self::UserNotFound("record not found".into()),
            StoreError::DuplicateEmail { email } => Self::UserExists(email),
            StoreError::UnknownCode { code } => Self::WrongCode(code),
            StoreError::CodeAlreadyRedeemed { code } => Self::CodeAlreadyUsed(code),
            other => Self::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redemption_errors_map_to_domain_errors() {
        let err: SkyeError = StoreError::UnknownCode { code: "X".into() }.into();
        assert!(matches!(err, SkyeError::WrongCode(c) if c == "X"));

        let err: SkyeError = StoreError::CodeAlreadyRedeemed { code: "X".into() }.into();
        assert!(matches!(err, SkyeError::CodeAlreadyUsed(_)));
    }

    #[test]
    fn database_errors_are_storage_errors() {
        let err: SkyeError = StoreError::Database("boom".into()).into();
        assert!(matches!(err, SkyeError::Storage(_)));
    }
}
