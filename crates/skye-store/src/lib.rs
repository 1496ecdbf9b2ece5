//! Storage layer for skye.
//!
//! This crate persists the ledger: users, redeem codes, gifts and completion
//! usage records. Balances are never stored; [`Store::account_summary`]
//! aggregates them from the history on every call.
//!
//! # Backends
//!
//! - [`PgStore`]: PostgreSQL via `sqlx`, with embedded migrations
//! - [`MemoryStore`]: in-process maps behind one async mutex, for tests and
//!   local development
//!
//! # Example
//!
//! ```no_run
//! use skye_store::{MemoryStore, Store};
//! use skye_core::{NewUser, User};
//!
//! # async fn demo() -> skye_store::Result<()> {
//! let store = MemoryStore::new();
//! let root = NewUser {
//!     email: "root@example.com".into(),
//!     password_hash: "$2b$12$...".into(),
//!     name: "root".into(),
//! }
//! .into_root(Some("ROOT-CODE".into()));
//! store.create_root_user(&root).await?;
//!
//! let summary = store.account_summary(&root.id).await?;
//! assert_eq!(summary.available_credit(), 0);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use skye_core::{AccountSummary, CompletionRecord, Gift, RedeemCode, Redemption, User, UserId};

/// The storage trait defining all database operations.
///
/// Compound operations (`register_user`, `redeem_code`,
/// `assign_invitation_code`) are atomic in every implementation.
#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert a self-invited root user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateEmail` if the email is taken.
    async fn create_root_user(&self, user: &User) -> Result<()>;

    /// Insert an invited user together with its registration gifts.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateEmail` if the email is taken; nothing is
    /// written in that case.
    async fn register_user(&self, user: &User, gifts: &[Gift]) -> Result<()>;

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    /// Get a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get the user owning an invitation code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_user_by_invitation_code(&self, code: &str) -> Result<Option<User>>;

    /// Set the user's invitation code unless one is already set.
    ///
    /// Returns the code the user owns afterwards.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the user doesn't exist.
    /// - `StoreError::DuplicateInvitationCode` if another user owns `code`.
    async fn assign_invitation_code(&self, user_id: &UserId, code: &str) -> Result<String>;

    /// Set or clear the VIP flag.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    async fn set_vip(&self, user_id: &UserId, is_vip: bool) -> Result<()>;

    /// Users invited by `inviter_id`, newest first. A root user is not its own invitee.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_invitees(&self, inviter_id: &UserId) -> Result<Vec<User>>;

    /// Number of registered users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn count_users(&self) -> Result<i64>;

    // =========================================================================
    // Redeem Code Operations
    // =========================================================================

    /// Insert an unredeemed code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code already exists or the operation fails.
    async fn put_redeem_code(&self, code: &RedeemCode) -> Result<()>;

    /// Redeem a code for `user` and pay the commission gift to its inviter.
    ///
    /// The code transition and the commission gift are written atomically.
    ///
    /// # Errors
    ///
    /// - `StoreError::UnknownCode` if no such code exists.
    /// - `StoreError::CodeAlreadyRedeemed` if the code was consumed earlier.
    async fn redeem_code(&self, user: &User, code: &str) -> Result<Redemption>;

    /// Codes redeemed by the user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_redeemed_codes(&self, user_id: &UserId) -> Result<Vec<RedeemCode>>;

    // =========================================================================
    // Gift Operations
    // =========================================================================

    /// Insert a gift.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn put_gift(&self, gift: &Gift) -> Result<()>;

    /// Gifts received by the user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_gifts(&self, user_id: &UserId) -> Result<Vec<Gift>>;

    // =========================================================================
    // Usage Operations
    // =========================================================================

    /// Append a completion usage record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn record_completion(&self, record: &CompletionRecord) -> Result<()>;

    /// Aggregate paid, gifted and used credit for the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn account_summary(&self, user_id: &UserId) -> Result<AccountSummary>;
}
