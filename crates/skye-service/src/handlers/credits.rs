//! Redeem code, balance and gift handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::{data, Envelope};
use crate::state::AppState;

/// Redeem request.
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    /// The redeem code.
    pub code: String,
}

/// Redeem a code for paid credit.
pub async fn redeem(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<RedeemRequest>,
) -> Result<StatusCode, ApiError> {
    state.ledger.redeem(&auth.user, req.code.trim()).await?;
    Ok(StatusCode::OK)
}

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Paid credit left after the gifted part is exhausted. May be negative.
    pub paid: i64,
    /// Gifted credit left, never negative.
    pub gifted: i64,
    /// `paid + gifted`.
    pub balance: i64,
}

/// Get the current balance split.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Envelope<BalanceResponse>>, ApiError> {
    let split = state.ledger.split_balance(&auth.user.id).await?;
    Ok(data(BalanceResponse {
        paid: split.paid,
        gifted: split.gifted,
        balance: split.total(),
    }))
}

/// One redeemed code.
#[derive(Debug, Serialize)]
pub struct RedeemedCodeResponse {
    /// The code.
    pub code: String,
    /// Credit granted.
    pub amount: i64,
    /// Redemption time (RFC 3339).
    pub redeemed_at: Option<String>,
}

/// List codes redeemed by the caller.
pub async fn list_redeem_codes(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Envelope<Vec<RedeemedCodeResponse>>>, ApiError> {
    let codes = state
        .ledger
        .redeem_history(&auth.user.id)
        .await?
        .into_iter()
        .map(|c| RedeemedCodeResponse {
            code: c.code,
            amount: c.amount,
            redeemed_at: c.redeemed_at.map(|t| t.to_rfc3339()),
        })
        .collect();

    Ok(data(codes))
}

/// One received gift.
#[derive(Debug, Serialize)]
pub struct GiftResponse {
    /// Credit granted.
    pub amount: i64,
    /// Why it was granted.
    pub reason: &'static str,
    /// Grant time (RFC 3339).
    pub gifted_at: String,
}

/// List gifts received by the caller.
pub async fn list_gifts(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Envelope<Vec<GiftResponse>>>, ApiError> {
    let gifts = state
        .ledger
        .gift_history(&auth.user.id)
        .await?
        .into_iter()
        .map(|g| GiftResponse {
            amount: g.amount,
            reason: g.reason.as_str(),
            gifted_at: g.gifted_at.to_rfc3339(),
        })
        .collect();

    Ok(data(gifts))
}
