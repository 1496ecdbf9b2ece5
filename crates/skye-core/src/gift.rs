//! Gifts: append-only bonus credit grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GiftId, UserId};

/// A bonus credit grant. Never modified or reversed once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gift {
    /// Unique gift ID (ULID for time-ordering).
    pub id: GiftId,

    /// Receiving user.
    pub user_id: UserId,

    /// Credit granted.
    pub amount: i64,

    /// Why the gift was granted.
    pub reason: GiftReason,

    /// When the gift was granted.
    pub gifted_at: DateTime<Utc>,
}

impl Gift {
    /// Create a new gift entry stamped with the current time.
    #[must_use]
    pub fn new(user_id: UserId, amount: i64, reason: GiftReason) -> Self {
        Self {
            id: GiftId::generate(),
            user_id,
            amount,
            reason,
            gifted_at: Utc::now(),
        }
    }
}

/// Why a gift was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GiftReason {
    /// Bonus for a newly registered user.
    RegistrationBonus,
    /// Bonus for an inviter when an invitee registers.
    ReferralBonus,
    /// Commission for an inviter when an invitee redeems a code.
    RedemptionCommission,
    /// Granted by an administrator.
    Manual,
}

impl GiftReason {
    /// Get the reason as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RegistrationBonus => "registration_bonus",
            Self::ReferralBonus => "referral_bonus",
            Self::RedemptionCommission => "redemption_commission",
            Self::Manual => "manual",
        }
    }

    /// Parse a stored reason. Unknown values read back as `Manual`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "registration_bonus" => Self::RegistrationBonus,
            "referral_bonus" => Self::ReferralBonus,
            "redemption_commission" => Self::RedemptionCommission,
            _ => Self::Manual,
        }
    }
}
