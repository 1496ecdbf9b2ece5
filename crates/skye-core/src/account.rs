//! Derived account balances.
//!
//! Balances are never stored. A summary is aggregated from the ledger history
//! (redeem codes, gifts and completions) each time it is needed.

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Default registration bonus granted to both the newcomer and the inviter.
pub const DEFAULT_GIFT_AMOUNT: i64 = 5000;

/// Aggregated ledger totals for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    /// Sum of redeemed code amounts.
    pub paid_balance: i64,

    /// Sum of received gifts.
    pub gifted_balance: i64,

    /// Sum of `total_usage` over all completions.
    pub total_usage: i64,
}

impl AccountSummary {
    /// Create a summary from the three aggregates.
    #[must_use]
    pub const fn new(paid_balance: i64, gifted_balance: i64, total_usage: i64) -> Self {
        Self {
            paid_balance,
            gifted_balance,
            total_usage,
        }
    }

    /// Credit left to spend: `paid + gifted - usage`.
    #[must_use]
    pub const fn available_credit(&self) -> i64 {
        self.paid_balance + self.gifted_balance - self.total_usage
    }

    /// Whether a paid operation may start. Zero credit blocks.
    #[must_use]
    pub const fn can_afford(&self) -> bool {
        self.available_credit() > 0
    }

    /// Split the balance into paid and gifted parts.
    ///
    /// Usage is charged against gifted credit first; whatever gifted credit
    /// cannot cover comes out of paid credit. Gifted is floored at zero, paid
    /// is left unclamped and may go negative.
    #[must_use]
    pub const fn split(&self) -> BalanceSplit {
        let mut paid = self.paid_balance;
        let mut gifted = self.gifted_balance - self.total_usage;
        if gifted < 0 {
            paid += gifted;
            gifted = 0;
        }
        BalanceSplit { paid, gifted }
    }
}

/// Presentational split of a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSplit {
    /// Remaining paid credit.
    pub paid: i64,
    /// Remaining gifted credit (never negative).
    pub gifted: i64,
}

impl BalanceSplit {
    /// Total of both parts.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.paid + self.gifted
    }
}
