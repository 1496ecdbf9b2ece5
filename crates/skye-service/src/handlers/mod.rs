//! API handlers.

use axum::Json;
use serde::Serialize;

pub mod admin;
pub mod ask;
pub mod auth;
pub mod credits;
pub mod health;
pub mod invitation;

/// Success envelope: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// Response payload.
    pub data: T,
}

/// Wrap `data` in the success envelope.
pub fn data<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { data })
}
