//! `OpenAI` completion API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use skye_core::{CompletionRequest, CompletionResponse, SkyeError};

use crate::dispatcher::CompletionBackend;

/// Error type for completion API operations.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    /// HTTP request failed, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error.
    #[error("OpenAI API error: {status} - {error}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        error: String,
        /// Error type reported by the API, e.g. `invalid_request_error`.
        code: Option<String>,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<OpenAiError> for SkyeError {
    fn from(e: OpenAiError) -> Self {
        Self::Upstream(e.to_string())
    }
}

/// Error envelope returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// `OpenAI` completion API client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API URL without the `/v1` suffix (e.g., `"https://api.openai.com"`)
    /// * `api_key` - API key sent as a bearer token
    /// * `timeout` - Upper bound for one completion call
    ///
    /// # Errors
    ///
    /// Returns `OpenAiError::Configuration` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OpenAiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OpenAiError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create a text completion. Never retried.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, a non-success status,
    /// or an undecodable body.
    pub async fn create_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, OpenAiError> {
        let url = format!("{}/v1/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, OpenAiError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => Err(OpenAiError::Api {
                status: status.as_u16(),
                error: envelope.error.message,
                code: envelope.error.kind,
            }),
            Err(_) => Err(OpenAiError::Api {
                status: status.as_u16(),
                error: format!("HTTP {status}"),
                code: None,
            }),
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> skye_core::Result<CompletionResponse> {
        self.create_completion(request).await.map_err(|e| {
            tracing::error!(error = %e, model = %request.model, "Completion request failed");
            SkyeError::from(e)
        })
    }
}
