//! Completion API backends.

mod canned;
mod client;

pub use canned::CannedBackend;
pub use client::{OpenAiClient, OpenAiError};
