//! In-memory storage implementation.
//!
//! All state lives behind one async mutex, so compound operations are
//! trivially atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use skye_core::{
    inviter_commission, AccountSummary, CompletionRecord, Gift, GiftReason, RedeemCode,
    Redemption, User, UserId,
};

use crate::error::{Result, StoreError};
use crate::Store;

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    redeem_codes: HashMap<String, RedeemCode>,
    gifts: Vec<Gift>,
    completions: Vec<CompletionRecord>,
}

impl Inner {
    fn email_taken(&self, email: &str) -> bool {
        self.users.values().any(|u| u.email == email)
    }
}

/// Map-backed storage implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    // =========================================================================
    // User Operations
    // =========================================================================

    async fn create_root_user(&self, user: &User) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.email_taken(&user.email) {
            return Err(StoreError::DuplicateEmail {
                email: user.email.clone(),
            });
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn register_user(&self, user: &User, gifts: &[Gift]) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.email_taken(&user.email) {
            return Err(StoreError::DuplicateEmail {
                email: user.email.clone(),
            });
        }
        inner.users.insert(user.id, user.clone());
        inner.gifts.extend_from_slice(gifts);
        Ok(())
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        Ok(self.inner.lock().await.users.get(user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_invitation_code(&self, code: &str) -> Result<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.invitation_code.as_deref() == Some(code))
            .cloned())
    }

    async fn assign_invitation_code(&self, user_id: &UserId, code: &str) -> Result<String> {
        let mut inner = self.inner.lock().await;

        let current = inner
            .users
            .get(user_id)
            .ok_or(StoreError::NotFound)?
            .invitation_code
            .clone();
        if let Some(existing) = current {
            return Ok(existing);
        }

        let collision = inner
            .users
            .values()
            .any(|u| u.invitation_code.as_deref() == Some(code));
        if collision {
            return Err(StoreError::DuplicateInvitationCode {
                code: code.to_string(),
            });
        }

        let user = inner.users.get_mut(user_id).ok_or(StoreError::NotFound)?;
        user.invitation_code = Some(code.to_string());
        Ok(code.to_string())
    }

    async fn set_vip(&self, user_id: &UserId, is_vip: bool) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let user = inner.users.get_mut(user_id).ok_or(StoreError::NotFound)?;
        user.is_vip = is_vip;
        Ok(())
    }

    async fn list_invitees(&self, inviter_id: &UserId) -> Result<Vec<User>> {
        let inner = self.inner.lock().await;
        let mut invitees: Vec<User> = inner
            .users
            .values()
            .filter(|u| u.inviter_id == *inviter_id && u.id != *inviter_id)
            .cloned()
            .collect();
        invitees.sort_by(|a, b| b.date_joined.cmp(&a.date_joined));
        Ok(invitees)
    }

    async fn count_users(&self) -> Result<i64> {
        let count = self.inner.lock().await.users.len();
        i64::try_from(count).map_err(|e| StoreError::Database(e.to_string()))
    }

    // =========================================================================
    // Redeem Code Operations
    // =========================================================================

    async fn put_redeem_code(&self, code: &RedeemCode) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.redeem_codes.contains_key(&code.code) {
            return Err(StoreError::Database(format!(
                "redeem code already exists: {}",
                code.code
            )));
        }
        inner.redeem_codes.insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn redeem_code(&self, user: &User, code: &str) -> Result<Redemption> {
        let mut inner = self.inner.lock().await;
        let now = Utc::now();

        let entry = inner
            .redeem_codes
            .get_mut(code)
            .ok_or_else(|| StoreError::UnknownCode {
                code: code.to_string(),
            })?;
        if entry.is_redeemed() {
            return Err(StoreError::CodeAlreadyRedeemed {
                code: code.to_string(),
            });
        }

        // The code is only marked redeemed once its commission is known.
        let amount = entry.amount;
        let inviter_gift = inviter_commission(amount);
        let commission = Gift {
            gifted_at: now,
            ..Gift::new(user.inviter_id, inviter_gift, GiftReason::RedemptionCommission)
        };

        entry.redeemer = Some(user.id);
        entry.redeemed_at = Some(now);
        inner.gifts.push(commission);

        Ok(Redemption {
            code: code.to_string(),
            amount,
            inviter_id: user.inviter_id,
            inviter_gift,
            redeemed_at: now,
        })
    }

    async fn list_redeemed_codes(&self, user_id: &UserId) -> Result<Vec<RedeemCode>> {
        let inner = self.inner.lock().await;
        let mut codes: Vec<RedeemCode> = inner
            .redeem_codes
            .values()
            .filter(|c| c.redeemer == Some(*user_id))
            .cloned()
            .collect();
        codes.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));
        Ok(codes)
    }

    // =========================================================================
    // Gift Operations
    // =========================================================================

    async fn put_gift(&self, gift: &Gift) -> Result<()> {
        self.inner.lock().await.gifts.push(gift.clone());
        Ok(())
    }

    async fn list_gifts(&self, user_id: &UserId) -> Result<Vec<Gift>> {
        let inner = self.inner.lock().await;
        let mut gifts: Vec<Gift> = inner
            .gifts
            .iter()
            .filter(|g| g.user_id == *user_id)
            .cloned()
            .collect();
        gifts.sort_by(|a, b| b.gifted_at.cmp(&a.gifted_at).then(b.id.cmp(&a.id)));
        Ok(gifts)
    }

    // =========================================================================
    // Usage Operations
    // =========================================================================

    async fn record_completion(&self, record: &CompletionRecord) -> Result<()> {
        self.inner.lock().await.completions.push(record.clone());
        Ok(())
    }

    async fn account_summary(&self, user_id: &UserId) -> Result<AccountSummary> {
        let inner = self.inner.lock().await;

        let paid = inner
            .redeem_codes
            .values()
            .filter(|c| c.redeemer == Some(*user_id))
            .map(|c| c.amount)
            .sum();
        let gifted = inner
            .gifts
            .iter()
            .filter(|g| g.user_id == *user_id)
            .map(|g| g.amount)
            .sum();
        let used = inner
            .completions
            .iter()
            .filter(|c| c.user_id == *user_id)
            .map(|c| c.total_usage)
            .sum();

        Ok(AccountSummary::new(paid, gifted, used))
    }
}
