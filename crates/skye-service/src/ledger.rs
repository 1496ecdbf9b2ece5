//! Credit ledger operations.
//!
//! Balances are recomputed from the stored history on every call. The
//! compound writes (registration, redemption) are delegated to the store,
//! which performs them atomically.

use std::sync::Arc;

use skye_core::{
    generate_invitation_code, AccountSummary, BalanceSplit, CompletionOutcome, CompletionRecord,
    Gift, GiftReason, NewUser, RedeemCode, Redemption, Result, SkyeError, User, UserId,
    MAX_REDEEM_AMOUNT,
};
use skye_store::{Store, StoreError};

/// Attempts at generating an unused invitation code before giving up.
const INVITATION_CODE_ATTEMPTS: usize = 5;

/// Largest batch accepted by [`Ledger::generate_redeem_codes`].
pub const MAX_REDEEM_CODE_BATCH: usize = 1000;

/// Ledger facade over a [`Store`].
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn Store>,
    gift_amount: i64,
}

impl Ledger {
    /// Create a ledger granting `gift_amount` per registration.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, gift_amount: i64) -> Self {
        Self { store, gift_amount }
    }

    // =========================================================================
    // Balances
    // =========================================================================

    /// Paid, gifted and used totals for the user.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Storage` if the store fails.
    pub async fn account_summary(&self, user_id: &UserId) -> Result<AccountSummary> {
        Ok(self.store.account_summary(user_id).await?)
    }

    /// `paid + gifted - usage`.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Storage` if the store fails.
    pub async fn available_credit(&self, user_id: &UserId) -> Result<i64> {
        Ok(self.account_summary(user_id).await?.available_credit())
    }

    /// Pre-flight check before a paid operation.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::InsufficientBalance` when no credit is left.
    pub async fn ensure_can_afford(&self, user_id: &UserId) -> Result<AccountSummary> {
        let summary = self.account_summary(user_id).await?;
        if !summary.can_afford() {
            return Err(SkyeError::InsufficientBalance {
                available: summary.available_credit(),
            });
        }
        Ok(summary)
    }

    /// Balance split into paid and gifted parts.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Storage` if the store fails.
    pub async fn split_balance(&self, user_id: &UserId) -> Result<BalanceSplit> {
        Ok(self.account_summary(user_id).await?.split())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Register a user under the owner of `invitation_code`.
    ///
    /// # Errors
    ///
    /// - `SkyeError::IllegalInvitationCode` if nobody owns the code.
    /// - `SkyeError::UserExists` if the email is taken.
    pub async fn register(&self, new_user: NewUser, invitation_code: &str) -> Result<User> {
        let inviter = self
            .store
            .get_user_by_invitation_code(invitation_code)
            .await?
            .ok_or_else(|| SkyeError::IllegalInvitationCode(invitation_code.to_string()))?;

        let user = new_user.into_user(inviter.id);
        self.grant_registration_bonus(&user, self.gift_amount).await?;

        tracing::info!(
            user_id = %user.id,
            inviter_id = %inviter.id,
            gift_amount = self.gift_amount,
            "User registered"
        );
        Ok(user)
    }

    /// Create `user` together with a gift of `amount` for it and one for its inviter.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::UserExists` if the email is taken; no gifts are written.
    pub async fn grant_registration_bonus(&self, user: &User, amount: i64) -> Result<()> {
        let gifts = [
            Gift::new(user.id, amount, GiftReason::RegistrationBonus),
            Gift::new(user.inviter_id, amount, GiftReason::ReferralBonus),
        ];
        self.store.register_user(user, &gifts).await?;
        Ok(())
    }

    /// The user's invitation code, generated on first request.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Storage` if no unused code could be generated.
    pub async fn invitation_code(&self, user: &User) -> Result<String> {
        if let Some(code) = &user.invitation_code {
            return Ok(code.clone());
        }

        for _ in 0..INVITATION_CODE_ATTEMPTS {
            let candidate = generate_invitation_code();
            match self.store.assign_invitation_code(&user.id, &candidate).await {
                Ok(code) => return Ok(code),
                Err(StoreError::DuplicateInvitationCode { code }) => {
                    tracing::warn!(code = %code, "Invitation code collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::Exhausted("invitation code").into())
    }

    /// Users invited by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Storage` if the store fails.
    pub async fn invitees(&self, user_id: &UserId) -> Result<Vec<User>> {
        Ok(self.store.list_invitees(user_id).await?)
    }

    /// Set or clear the VIP flag.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::UserNotFound` if the user doesn't exist.
    pub async fn set_vip(&self, user_id: &UserId, is_vip: bool) -> Result<()> {
        match self.store.set_vip(user_id, is_vip).await {
            Ok(()) => {
                tracing::info!(user_id = %user_id, is_vip, "VIP flag updated");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(SkyeError::UserNotFound(user_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Redeem Codes
    // =========================================================================

    /// Redeem `code` for `user`, paying the inviter's commission.
    ///
    /// # Errors
    ///
    /// - `SkyeError::WrongCode` if the code does not exist.
    /// - `SkyeError::CodeAlreadyUsed` if it was redeemed before.
    pub async fn redeem(&self, user: &User, code: &str) -> Result<Redemption> {
        let redemption = self.store.redeem_code(user, code).await?;
        tracing::info!(
            user_id = %user.id,
            amount = redemption.amount,
            inviter_id = %redemption.inviter_id,
            inviter_gift = redemption.inviter_gift,
            "Redeem code redeemed"
        );
        Ok(redemption)
    }

    /// Issue `count` fresh codes worth `amount` each.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Validation` for an amount outside
    /// `1..=MAX_REDEEM_AMOUNT` or a count outside `1..=MAX_REDEEM_CODE_BATCH`.
    pub async fn generate_redeem_codes(&self, amount: i64, count: usize) -> Result<Vec<RedeemCode>> {
        if !(1..=MAX_REDEEM_AMOUNT).contains(&amount) {
            return Err(SkyeError::Validation(format!(
                "amount must be between 1 and {MAX_REDEEM_AMOUNT}"
            )));
        }
        if count == 0 || count > MAX_REDEEM_CODE_BATCH {
            return Err(SkyeError::Validation(format!(
                "count must be between 1 and {MAX_REDEEM_CODE_BATCH}"
            )));
        }

        let mut codes = Vec::with_capacity(count);
        for _ in 0..count {
            let code = RedeemCode::generate(amount);
            self.store.put_redeem_code(&code).await?;
            codes.push(code);
        }

        tracing::info!(amount, count, "Redeem codes generated");
        Ok(codes)
    }

    /// Codes redeemed by the user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Storage` if the store fails.
    pub async fn redeem_history(&self, user_id: &UserId) -> Result<Vec<RedeemCode>> {
        Ok(self.store.list_redeemed_codes(user_id).await?)
    }

    // =========================================================================
    // Gifts
    // =========================================================================

    /// Gifts received by the user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Storage` if the store fails.
    pub async fn gift_history(&self, user_id: &UserId) -> Result<Vec<Gift>> {
        Ok(self.store.list_gifts(user_id).await?)
    }

    /// Grant an administrative gift.
    ///
    /// # Errors
    ///
    /// - `SkyeError::Validation` unless the amount is positive.
    /// - `SkyeError::UserNotFound` if the user doesn't exist.
    pub async fn grant_gift(&self, user_id: &UserId, amount: i64, reason: GiftReason) -> Result<Gift> {
        if amount <= 0 {
            return Err(SkyeError::Validation("amount must be positive".into()));
        }
        if self.store.get_user(user_id).await?.is_none() {
            return Err(SkyeError::UserNotFound(user_id.to_string()));
        }

        let gift = Gift::new(*user_id, amount, reason);
        self.store.put_gift(&gift).await?;
        tracing::info!(user_id = %user_id, amount, reason = reason.as_str(), "Gift granted");
        Ok(gift)
    }

    // =========================================================================
    // Usage
    // =========================================================================

    /// Append a usage record for one dispatched completion.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Storage` if the store fails.
    pub async fn record_usage(
        &self,
        user_id: &UserId,
        codename: &str,
        prompt_payload: serde_json::Value,
        outcome: &CompletionOutcome,
    ) -> Result<CompletionRecord> {
        let record = CompletionRecord::from_outcome(*user_id, codename, prompt_payload, outcome);
        self.store.record_completion(&record).await?;
        tracing::debug!(
            user_id = %user_id,
            model = codename,
            total_usage = record.total_usage,
            "Usage recorded"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skye_store::MemoryStore;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "hash".into(),
            name: email.into(),
        }
    }

    async fn ledger_with_root() -> (Ledger, User) {
        let store = Arc::new(MemoryStore::new());
        let root = new_user("root@example.com").into_root(Some("ROOT".into()));
        store.create_root_user(&root).await.unwrap();
        (Ledger::new(store, 5000), root)
    }

    fn outcome(total: i64) -> CompletionOutcome {
        CompletionOutcome {
            prompt: "p".into(),
            completion: "c".into(),
            finish_reason: "stop".into(),
            prompt_token_usage: 0,
            completion_token_usage: total,
            total_token_usage: total,
        }
    }

    #[tokio::test]
    async fn registration_gifts_both_sides() {
        let (ledger, root) = ledger_with_root().await;
        let a = ledger.register(new_user("a@example.com"), "ROOT").await.unwrap();
        ledger.register(new_user("b@example.com"), "ROOT").await.unwrap();

        assert_eq!(ledger.account_summary(&root.id).await.unwrap().gifted_balance, 10000);
        assert_eq!(ledger.account_summary(&a.id).await.unwrap().gifted_balance, 5000);
    }

    #[tokio::test]
    async fn registration_errors() {
        let (ledger, root) = ledger_with_root().await;
        let illegal = ledger.register(new_user("a@example.com"), "NOPE").await;
        assert!(matches!(illegal, Err(SkyeError::IllegalInvitationCode(_))));

        ledger.register(new_user("a@example.com"), "ROOT").await.unwrap();
        let dup = ledger.register(new_user("a@example.com"), "ROOT").await;
        assert!(matches!(dup, Err(SkyeError::UserExists(_))));

        // The rejected registration must not pay the referral bonus.
        assert_eq!(ledger.account_summary(&root.id).await.unwrap().gifted_balance, 5000);
        assert_eq!(ledger.gift_history(&root.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn balance_fixture() {
        let store = Arc::new(MemoryStore::new());
        let root = new_user("root@example.com").into_root(Some("ROOT".into()));
        store.create_root_user(&root).await.unwrap();
        let ledger = Ledger::new(store.clone(), 5);

        let user = ledger.register(new_user("a@example.com"), "ROOT").await.unwrap();
        store.put_redeem_code(&RedeemCode::with_code("TEN", 10)).await.unwrap();
        ledger.redeem(&user, "TEN").await.unwrap();
        assert_eq!(ledger.available_credit(&user.id).await.unwrap(), 15);

        ledger.record_usage(&user.id, "t.1", serde_json::json!({}), &outcome(5)).await.unwrap();
        assert_eq!(ledger.available_credit(&user.id).await.unwrap(), 10);
        assert_eq!(
            ledger.split_balance(&user.id).await.unwrap(),
            BalanceSplit { paid: 10, gifted: 0 }
        );

        ledger.record_usage(&user.id, "t.1", serde_json::json!({}), &outcome(20)).await.unwrap();
        assert_eq!(ledger.available_credit(&user.id).await.unwrap(), -10);
        assert!(matches!(
            ledger.ensure_can_afford(&user.id).await,
            Err(SkyeError::InsufficientBalance { available: -10 })
        ));
    }

    #[tokio::test]
    async fn redeem_pays_three_percent() {
        let store = Arc::new(MemoryStore::new());
        let root = new_user("root@example.com").into_root(Some("ROOT".into()));
        store.create_root_user(&root).await.unwrap();
        let ledger = Ledger::new(store.clone(), 0);
        let user = ledger.register(new_user("a@example.com"), "ROOT").await.unwrap();

        store.put_redeem_code(&RedeemCode::with_code("FIFTY", 50)).await.unwrap();
        let redemption = ledger.redeem(&user, "FIFTY").await.unwrap();
        assert_eq!(redemption.inviter_gift, 1);

        let again = ledger.redeem(&user, "FIFTY").await;
        assert!(matches!(again, Err(SkyeError::CodeAlreadyUsed(_))));
        assert_eq!(ledger.account_summary(&root.id).await.unwrap().gifted_balance, 1);

        let history = ledger.redeem_history(&user.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].code, "FIFTY");
    }

    #[tokio::test]
    async fn invitation_code_is_stable() {
        let (ledger, root) = ledger_with_root().await;
        let user = ledger.register(new_user("a@example.com"), "ROOT").await.unwrap();

        let first = ledger.invitation_code(&user).await.unwrap();
        assert_eq!(first.len(), 19);

        let reloaded = ledger.store.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(ledger.invitation_code(&reloaded).await.unwrap(), first);
        assert_eq!(ledger.invitation_code(&root).await.unwrap(), "ROOT");
    }

    #[tokio::test]
    async fn redeem_code_batches_are_validated() {
        let (ledger, _root) = ledger_with_root().await;
        assert!(ledger.generate_redeem_codes(0, 1).await.is_err());
        assert!(ledger.generate_redeem_codes(-5, 1).await.is_err());
        assert!(ledger.generate_redeem_codes(100, 0).await.is_err());
        assert!(matches!(
            ledger.generate_redeem_codes(MAX_REDEEM_AMOUNT + 1, 1).await,
            Err(SkyeError::Validation(_))
        ));
        assert!(matches!(
            ledger.generate_redeem_codes(i64::MAX, 1).await,
            Err(SkyeError::Validation(_))
        ));
        ledger.generate_redeem_codes(MAX_REDEEM_AMOUNT, 1).await.unwrap();

        let codes = ledger.generate_redeem_codes(100, 3).await.unwrap();
        assert_eq!(codes.len(), 3);
        assert!(codes.iter().all(|c| c.code.len() == 40 && !c.is_redeemed()));
    }

    #[tokio::test]
    async fn manual_gift_requires_existing_user() {
        let (ledger, root) = ledger_with_root().await;
        let missing = ledger.grant_gift(&UserId::generate(), 10, GiftReason::Manual).await;
        assert!(matches!(missing, Err(SkyeError::UserNotFound(_))));

        ledger.grant_gift(&root.id, 10, GiftReason::Manual).await.unwrap();
        let gifts = ledger.gift_history(&root.id).await.unwrap();
        assert_eq!(gifts.len(), 1);
        assert_eq!(gifts[0].reason, GiftReason::Manual);
    }

    #[tokio::test]
    async fn non_positive_gifts_are_rejected() {
        let (ledger, root) = ledger_with_root().await;
        for amount in [0, -1, -5000, i64::MIN] {
            let result = ledger.grant_gift(&root.id, amount, GiftReason::Manual).await;
            assert!(matches!(result, Err(SkyeError::Validation(_))), "amount {amount}");
        }
        assert!(ledger.gift_history(&root.id).await.unwrap().is_empty());
        assert_eq!(ledger.available_credit(&root.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_redemptions_pay_once() {
        let store = Arc::new(MemoryStore::new());
        let root = new_user("root@example.com").into_root(Some("ROOT".into()));
        store.create_root_user(&root).await.unwrap();
        let ledger = Ledger::new(store.clone(), 0);
        let a = ledger.register(new_user("a@example.com"), "ROOT").await.unwrap();
        let b = ledger.register(new_user("b@example.com"), "ROOT").await.unwrap();

        store.put_redeem_code(&RedeemCode::with_code("SHARED", 1234)).await.unwrap();
        let (first, second) = tokio::join!(ledger.redeem(&a, "SHARED"), ledger.redeem(&b, "SHARED"));

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(SkyeError::CodeAlreadyUsed(_))))
                .count(),
            1
        );

        let paid = ledger.split_balance(&a.id).await.unwrap().paid
            + ledger.split_balance(&b.id).await.unwrap().paid;
        assert_eq!(paid, 1234);
        assert_eq!(ledger.account_summary(&root.id).await.unwrap().gifted_balance, 37);
    }

    #[tokio::test]
    async fn huge_redemption_commission() {
        let store = Arc::new(MemoryStore::new());
        let root = new_user("root@example.com").into_root(Some("ROOT".into()));
        store.create_root_user(&root).await.unwrap();
        let ledger = Ledger::new(store.clone(), 0);
        let user = ledger.register(new_user("a@example.com"), "ROOT").await.unwrap();

        let amount = i64::MAX / 2;
        store.put_redeem_code(&RedeemCode::with_code("HUGE", amount)).await.unwrap();
        let redemption = ledger.redeem(&user, "HUGE").await.unwrap();
        assert_eq!(redemption.inviter_gift, skye_core::inviter_commission(amount));
        assert!(redemption.inviter_gift > 0);
    }
}
