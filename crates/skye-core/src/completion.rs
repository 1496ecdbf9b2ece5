//! Completion API contract.
//!
//! These types mirror the remote text-completion endpoint. The dispatcher
//! sends a [`CompletionRequest`], receives a [`CompletionResponse`] and
//! normalises it into a [`CompletionOutcome`].

use serde::{Deserialize, Serialize};

use crate::{Result, SkyeError};

/// Request body for the remote completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Upstream model identifier, e.g. `text-davinci-003`.
    pub model: String,
    /// Fully rendered prompt.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens the completion may use.
    pub max_tokens: i64,
}

/// Response body from the remote completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated choices; only the first is used.
    pub choices: Vec<Choice>,
    /// Token accounting.
    pub usage: TokenUsage,
}

/// One generated choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Generated text.
    pub text: String,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token counters reported by the remote API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: i64,
    /// Tokens in the completion. Sometimes omitted upstream.
    #[serde(default)]
    pub completion_tokens: i64,
    /// Tokens billed in total.
    pub total_tokens: i64,
}

impl CompletionResponse {
    /// Build a single-choice response.
    #[must_use]
    pub fn single(text: impl Into<String>, finish_reason: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            choices: vec![Choice {
                text: text.into(),
                finish_reason: Some(finish_reason.into()),
            }],
            usage,
        }
    }

    /// Text of the first choice, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.text.as_str())
    }
}

/// Normalised result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    /// The rendered prompt that was sent.
    pub prompt: String,
    /// Completion text.
    pub completion: String,
    /// Finish reason.
    pub finish_reason: String,
    /// Prompt tokens.
    pub prompt_token_usage: i64,
    /// Completion tokens.
    pub completion_token_usage: i64,
    /// Total tokens.
    pub total_token_usage: i64,
}

impl CompletionOutcome {
    /// Normalise a remote response against the prompt that produced it.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Upstream` if the response carries no choices.
    pub fn normalize(prompt: impl Into<String>, response: CompletionResponse) -> Result<Self> {
        let usage = response.usage;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SkyeError::Upstream("completion response has no choices".into()))?;

        Ok(Self {
            prompt: prompt.into(),
            completion: choice.text,
            finish_reason: choice.finish_reason.unwrap_or_default(),
            prompt_token_usage: usage.prompt_tokens,
            completion_token_usage: usage.completion_tokens,
            total_token_usage: usage.total_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_completion_tokens_defaults_to_zero() {
        let response: CompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"text": "Hi!", "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "total_tokens": 10}
        }))
        .unwrap();
        assert_eq!(response.usage.completion_tokens, 0);
    }

    #[test]
    fn normalize_takes_first_choice() {
        let response = CompletionResponse {
            choices: vec![
                Choice {
                    text: "first".into(),
                    finish_reason: Some("stop".into()),
                },
                Choice {
                    text: "second".into(),
                    finish_reason: Some("length".into()),
                },
            ],
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 90,
                total_tokens: 100,
            },
        };

        let outcome = CompletionOutcome::normalize("Hello!", response).unwrap();
        assert_eq!(
            outcome,
            CompletionOutcome {
                prompt: "Hello!".into(),
                completion: "first".into(),
                finish_reason: "stop".into(),
                prompt_token_usage: 10,
                completion_token_usage: 90,
                total_token_usage: 100,
            }
        );
    }

    #[test]
    fn normalize_rejects_empty_choices() {
        let response = CompletionResponse {
            choices: vec![],
            usage: TokenUsage::default(),
        };
        let err = CompletionOutcome::normalize("p", response).unwrap_err();
        assert!(matches!(err, SkyeError::Upstream(_)));
    }

    #[test]
    fn request_serializes_upstream_field_names() {
        let request = CompletionRequest {
            model: "text-davinci-003".into(),
            prompt: "Hello".into(),
            temperature: 0.5,
            max_tokens: 4081,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_tokens"], 4081);
        assert_eq!(json["temperature"], 0.5);
    }
}
