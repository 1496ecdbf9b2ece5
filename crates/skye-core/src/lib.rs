//! Core types and utilities for skye.
//!
//! This crate provides the foundational types used throughout the skye backend:
//!
//! - **Identifiers**: `UserId`, `GiftId`, `CompletionId`
//! - **Users**: `User`, `NewUser`, invitation codes
//! - **Ledger entries**: `RedeemCode`, `Gift`, `CompletionRecord`
//! - **Balances**: `AccountSummary`, `BalanceSplit`
//! - **Prompts**: `TemplateRegistry`, `ModelDefinition`, rendering and token budgeting
//! - **Completions**: the remote API contract, normalisation and the safety gate
//!
//! # Credit Unit
//!
//! **1 credit = 1 token of reported total usage**
//!
//! - A redeem code worth 5000 grants 5000 credits
//! - A completion that reports `total_tokens = 100` debits 100 credits
//! - Stored as `i64` so balances may go negative after a final expensive call

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod completion;
pub mod error;
pub mod gift;
pub mod ids;
pub mod prompt;
pub mod redeem;
pub mod safety;
pub mod usage;
pub mod user;

pub use account::{AccountSummary, BalanceSplit, DEFAULT_GIFT_AMOUNT};
pub use completion::{Choice, CompletionOutcome, CompletionRequest, CompletionResponse, TokenUsage};
pub use error::{ErrorKind, Result, SkyeError};
pub use gift::{Gift, GiftReason};
pub use ids::{CompletionId, GiftId, IdError, UserId};
pub use prompt::{
    estimate_tokens, output_token_budget, Lang, Level, ModelDefinition, Mode, PromptFields,
    PromptParams, RenderConfig, Template, TemplateBody, TemplateRegistry, MAX_CONTEXT_TOKENS,
};
pub use redeem::{
    generate_redeem_code, inviter_commission, RedeemCode, Redemption,
    INVITER_COMMISSION_PERCENT, MAX_REDEEM_AMOUNT, REDEEM_CODE_LEN,
};
pub use usage::CompletionRecord;
pub use user::{generate_invitation_code, NewUser, User};
