//! Completion usage records.
//!
//! Every dispatched completion, including decoy responses, appends one record.
//! Summing `total_usage` over these records is the only source of debits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CompletionId, CompletionOutcome, UserId};

/// One model invocation charged to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Unique record ID (ULID for time-ordering).
    pub id: CompletionId,

    /// The user being charged.
    pub user_id: UserId,

    /// Template codename, e.g. `dict.1`.
    pub model: String,

    /// The caller's prompt fields as received.
    pub prompt: serde_json::Value,

    /// Returned completion text.
    pub completion: String,

    /// Finish reason reported by the model.
    pub finish_reason: String,

    /// Prompt tokens.
    pub prompt_usage: i64,

    /// Completion tokens.
    pub completion_usage: i64,

    /// Total tokens; this is what the user pays.
    pub total_usage: i64,

    /// When the completion was recorded.
    pub created_at: DateTime<Utc>,
}

impl CompletionRecord {
    /// Create a usage record from raw counters.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        model: impl Into<String>,
        prompt: serde_json::Value,
        completion: impl Into<String>,
        finish_reason: impl Into<String>,
        prompt_usage: i64,
        completion_usage: i64,
        total_usage: i64,
    ) -> Self {
        Self {
            id: CompletionId::generate(),
            user_id,
            model: model.into(),
            prompt,
            completion: completion.into(),
            finish_reason: finish_reason.into(),
            prompt_usage,
            completion_usage,
            total_usage,
            created_at: Utc::now(),
        }
    }

    /// Create a usage record from a normalised dispatcher outcome.
    #[must_use]
    pub fn from_outcome(
        user_id: UserId,
        codename: &str,
        prompt: serde_json::Value,
        outcome: &CompletionOutcome,
    ) -> Self {
        Self::new(
            user_id,
            codename,
            prompt,
            outcome.completion.clone(),
            outcome.finish_reason.clone(),
            outcome.prompt_token_usage,
            outcome.completion_token_usage,
            outcome.total_token_usage,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_from_outcome_copies_counters() {
        let outcome = CompletionOutcome {
            prompt: "Hello!".into(),
            completion: "Hi!".into(),
            finish_reason: "stop".into(),
            prompt_token_usage: 10,
            completion_token_usage: 90,
            total_token_usage: 100,
        };
        let user = UserId::generate();
        let record =
            CompletionRecord::from_outcome(user, "gpt.1", serde_json::json!({"prompt": "Hello!"}), &outcome);

        assert_eq!(record.user_id, user);
        assert_eq!(record.model, "gpt.1");
        assert_eq!(record.completion, "Hi!");
        assert_eq!(record.total_usage, 100);
        assert_eq!(record.prompt["prompt"], "Hello!");
    }
}
