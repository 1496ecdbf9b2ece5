//! Invitation code and invitee handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::{data, Envelope};
use crate::state::AppState;

/// Invitation code response.
#[derive(Debug, Serialize)]
pub struct InvitationCodeResponse {
    /// The caller's invitation code.
    pub code: String,
}

/// Get the caller's invitation code, generating it on first request.
pub async fn get_invitation_code(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Envelope<InvitationCodeResponse>>, ApiError> {
    let code = state.ledger.invitation_code(&auth.user).await?;
    Ok(data(InvitationCodeResponse { code }))
}

/// One invitee.
#[derive(Debug, Serialize)]
pub struct InviteeResponse {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Registration time (RFC 3339).
    pub joined_at: String,
}

/// List users invited by the caller, newest first.
pub async fn list_invitees(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Envelope<Vec<InviteeResponse>>>, ApiError> {
    let invitees = state
        .ledger
        .invitees(&auth.user.id)
        .await?
        .into_iter()
        .map(|u| InviteeResponse {
            name: u.name,
            email: u.email,
            joined_at: u.date_joined.to_rfc3339(),
        })
        .collect();

    Ok(data(invitees))
}
