//! Redeem codes: one-time tokens exchanged for paid credit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::UserId;

/// Length of a redeem code in characters.
pub const REDEEM_CODE_LEN: usize = 40;

/// Percentage of a redeemed amount paid to the redeemer's inviter.
pub const INVITER_COMMISSION_PERCENT: i64 = 3;

/// A redeem code.
///
/// Unredeemed while `redeemer` and `redeemed_at` are both `None`. A code
/// moves to redeemed exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemCode {
    /// The token itself, unique.
    pub code: String,

    /// Credit granted on redemption.
    pub amount: i64,

    /// When the code was issued.
    pub created_at: DateTime<Utc>,

    /// Who redeemed the code.
    pub redeemer: Option<UserId>,

    /// When the code was redeemed.
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl RedeemCode {
    /// Issue a new unredeemed code with a random token.
    #[must_use]
    pub fn generate(amount: i64) -> Self {
        Self::with_code(generate_redeem_code(), amount)
    }

    /// Issue a new unredeemed code with a chosen token.
    #[must_use]
    pub fn with_code(code: impl Into<String>, amount: i64) -> Self {
        Self {
            code: code.into(),
            amount,
            created_at: Utc::now(),
            redeemer: None,
            redeemed_at: None,
        }
    }

    /// Whether the code has been consumed.
    #[must_use]
    pub const fn is_redeemed(&self) -> bool {
        self.redeemer.is_some()
    }
}

/// Outcome of a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redemption {
    /// The redeemed token.
    pub code: String,
    /// Credit granted to the redeemer.
    pub amount: i64,
    /// Inviter who received the commission gift.
    pub inviter_id: UserId,
    /// Commission granted to the inviter.
    pub inviter_gift: i64,
    /// When the code was redeemed.
    pub redeemed_at: DateTime<Utc>,
}

/// Largest amount a single redeem code may carry.
pub const MAX_REDEEM_AMOUNT: i64 = 1_000_000_000_000;

/// Commission owed to the inviter for a redemption, truncated toward zero.
///
/// Splits `amount` around 100 so the product never overflows.
#[must_use]
pub const fn inviter_commission(amount: i64) -> i64 {
    amount / 100 * INVITER_COMMISSION_PERCENT + amount % 100 * INVITER_COMMISSION_PERCENT / 100
}

/// Generate a random 40-character upper-case hex token.
#[must_use]
pub fn generate_redeem_code() -> String {
    let digest = Sha256::digest(uuid::Uuid::new_v4().to_string().as_bytes());
    let mut code = hex::encode_upper(digest);
    code.truncate(REDEEM_CODE_LEN);
    code
}
