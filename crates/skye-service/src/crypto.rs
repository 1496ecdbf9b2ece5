//! Password hashing and secret comparison.

use bcrypt::BcryptError;
use tokio::task::JoinError;

/// Failure of a password hash run on the blocking pool.
#[derive(Debug, thiserror::Error)]
pub enum HashTaskError {
    /// bcrypt rejected the input.
    #[error(transparent)]
    Bcrypt(#[from] BcryptError),

    /// The blocking task panicked or was cancelled.
    #[error("hashing task failed: {0}")]
    Join(#[from] JoinError),
}

/// Hash a password with bcrypt at the given cost.
///
/// # Errors
///
/// Returns an error if the cost is out of range.
pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::hash(password, cost)
}

/// Verify a password against its hash. A malformed hash never matches.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// [`hash_password`] on the blocking thread pool.
///
/// # Errors
///
/// Returns an error if the cost is out of range or the task fails.
pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String, HashTaskError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??;
    Ok(hash)
}

/// [`verify_password`] on the blocking thread pool.
///
/// # Errors
///
/// Returns an error if the task fails.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, JoinError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await
}

/// Constant-time string comparison to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn password_roundtrip() {
        let hash = hash_password("hunter2", TEST_COST).unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[tokio::test]
    async fn blocking_pool_roundtrip() {
        let hash = hash_password_blocking("hunter2".into(), TEST_COST).await.unwrap();
        assert!(verify_password_blocking("hunter2".into(), hash.clone()).await.unwrap());
        assert!(!verify_password_blocking("hunter3".into(), hash).await.unwrap());

        let bad_cost = hash_password_blocking("hunter2".into(), 99).await;
        assert!(matches!(bad_cost, Err(HashTaskError::Bcrypt(_))));
    }

    #[test]
    fn malformed_hash_does_not_match() {
        assert!(!verify_password("test", "not_a_valid_hash"));
    }

    #[test]
    fn constant_time_eq_equal_strings() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(constant_time_eq("", ""));
    }

    #[test]
    fn constant_time_eq_different_strings() {
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "ab"));
        assert!(!constant_time_eq("abc", "ABC"));
    }
}
