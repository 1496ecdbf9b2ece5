//! Skye HTTP API Service.
//!
//! This crate provides the HTTP API for skye, including:
//!
//! - Invitation-only registration and session login
//! - Credit balance, redeem codes and gifts
//! - Prompt dispatch to the completion API, debited per token
//! - Administrative code issuing, VIP flags and manual gifts
//!
//! # Authentication
//!
//! The service supports two authentication methods:
//!
//! 1. **Session JWT tokens** - Issued by `/login`, sent as `Authorization: Bearer`
//! 2. **Admin API key** - `X-Admin-Key` header for `/admin/*`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers without awaits stay async for the router

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod crypto;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod openai;
pub mod routes;
pub mod state;

pub use config::{SeedAccount, ServiceConfig};
pub use dispatcher::{CompletionBackend, Dispatcher};
pub use error::ApiError;
pub use ledger::Ledger;
pub use openai::{CannedBackend, OpenAiClient, OpenAiError};
pub use routes::create_router;
pub use state::AppState;
