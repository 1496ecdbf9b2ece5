//! Administrative handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use skye_core::{GiftReason, UserId};

use crate::auth::AdminAuth;
use crate::error::ApiError;
use crate::handlers::{data, Envelope};
use crate::state::AppState;

/// Redeem code batch request.
#[derive(Debug, Deserialize)]
pub struct GenerateCodesRequest {
    /// Credit per code.
    pub amount: i64,
    /// Number of codes (default: 1).
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    1
}

/// A freshly issued code.
#[derive(Debug, Serialize)]
pub struct IssuedCodeResponse {
    /// The code.
    pub code: String,
    /// Credit granted on redemption.
    pub amount: i64,
}

/// Issue a batch of redeem codes.
pub async fn generate_redeem_codes(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    Json(req): Json<GenerateCodesRequest>,
) -> Result<Json<Envelope<Vec<IssuedCodeResponse>>>, ApiError> {
    let codes = state.ledger.generate_redeem_codes(req.amount, req.count).await?;

    tracing::info!(
        admin_id = %admin.admin_id,
        amount = req.amount,
        count = codes.len(),
        "Admin issued redeem codes"
    );

    Ok(data(
        codes
            .into_iter()
            .map(|c| IssuedCodeResponse {
                code: c.code,
                amount: c.amount,
            })
            .collect(),
    ))
}

/// VIP flag request.
#[derive(Debug, Deserialize)]
pub struct SetVipRequest {
    /// New VIP flag.
    pub vip: bool,
}

/// Set or clear a user's VIP flag.
pub async fn set_vip(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    Path(user_id): Path<String>,
    Json(req): Json<SetVipRequest>,
) -> Result<StatusCode, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    state.ledger.set_vip(&user_id, req.vip).await?;

    tracing::info!(admin_id = %admin.admin_id, user_id = %user_id, vip = req.vip, "Admin set VIP flag");
    Ok(StatusCode::OK)
}

/// Manual gift request.
#[derive(Debug, Deserialize)]
pub struct GrantGiftRequest {
    /// Receiving user.
    pub user_id: String,
    /// Credit to grant; must be positive.
    pub amount: i64,
}

/// Gift response.
#[derive(Debug, Serialize)]
pub struct GrantGiftResponse {
    /// Gift ID.
    pub id: String,
    /// Receiving user.
    pub user_id: String,
    /// Credit granted.
    pub amount: i64,
}

/// Grant a manual gift.
pub async fn grant_gift(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    Json(req): Json<GrantGiftRequest>,
) -> Result<Json<Envelope<GrantGiftResponse>>, ApiError> {
    let user_id = parse_user_id(&req.user_id)?;
    let gift = state
        .ledger
        .grant_gift(&user_id, req.amount, GiftReason::Manual)
        .await?;

    tracing::info!(
        admin_id = %admin.admin_id,
        user_id = %user_id,
        amount = req.amount,
        "Admin granted gift"
    );

    Ok(data(GrantGiftResponse {
        id: gift.id.to_string(),
        user_id: gift.user_id.to_string(),
        amount: gift.amount,
    }))
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::InvalidParams(format!("invalid user id: {raw}")))
}
