//! Prompt dispatch handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use skye_core::{PromptFields, PromptParams};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::{data, Envelope};
use crate::state::AppState;

/// Shown instead of an empty completion.
pub const EMPTY_COMPLETION_FALLBACK: &str = "\n这个我不会，请换一种表述。";

/// Ask request.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Template name, e.g. `dict`.
    pub model: String,
    /// Template fields.
    pub prompts: serde_json::Value,
    /// Optional `mode` / `lang` parameters.
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

/// Ask response.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// Completion text.
    pub completion: String,
    /// Finish reason reported by the completion API.
    pub finish_reason: String,
}

/// Render a template, call the completion API and debit the usage.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<AskRequest>,
) -> Result<Json<Envelope<AskResponse>>, ApiError> {
    let user = auth.user;
    let definition = state.dispatcher.resolve(&req.model, &user)?;

    state.ledger.ensure_can_afford(&user.id).await?;

    let fields = PromptFields::from_json(&req.prompts)?;
    let params = PromptParams::from_json(req.params.as_ref())?;

    let outcome = state.dispatcher.dispatch(definition, &fields, &params).await?;

    state
        .ledger
        .record_usage(&user.id, definition.codename, req.prompts, &outcome)
        .await?;

    let completion = if outcome.completion.is_empty() {
        EMPTY_COMPLETION_FALLBACK.to_string()
    } else {
        outcome.completion
    };

    Ok(data(AskResponse {
        completion,
        finish_reason: outcome.finish_reason,
    }))
}
