//! Prompt dispatch pipeline.
//!
//! resolve → configure params → render → budget → safety in → call →
//! safety out → normalise.

use std::sync::Arc;

use async_trait::async_trait;

use skye_core::safety::{blocked_keyword, decoy_response};
use skye_core::{
    CompletionOutcome, CompletionRequest, CompletionResponse, ModelDefinition, PromptFields,
    PromptParams, Result, SkyeError, TemplateRegistry, User,
};

/// A remote text-completion endpoint.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one completion request.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Upstream` if the call fails for any reason.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}

/// Renders prompts from the template registry and sends them to a backend.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<TemplateRegistry>,
    backend: Arc<dyn CompletionBackend>,
}

impl Dispatcher {
    /// Create a dispatcher.
    #[must_use]
    pub fn new(registry: Arc<TemplateRegistry>, backend: Arc<dyn CompletionBackend>) -> Self {
        Self { registry, backend }
    }

    /// The template registry.
    #[must_use]
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Look up a model and check that `user` may use it.
    ///
    /// # Errors
    ///
    /// - `SkyeError::UnknownModel` if no template has this name.
    /// - `SkyeError::ModelNotEntitled` for a VIP-only model and a non-VIP user.
    pub fn resolve(&self, model: &str, user: &User) -> Result<&ModelDefinition> {
        let definition = self
            .registry
            .get(model)
            .ok_or_else(|| SkyeError::UnknownModel(model.to_string()))?;

        if definition.vip_only && !user.is_vip {
            return Err(SkyeError::ModelNotEntitled(model.to_string()));
        }

        Ok(definition)
    }

    /// Render, send and normalise one request.
    ///
    /// A prompt or completion containing a blacklisted keyword yields the
    /// zero-usage decoy.
    ///
    /// # Errors
    ///
    /// - `SkyeError::Validation` / `SkyeError::PromptTooLong` for bad input;
    ///   the backend is not called.
    /// - `SkyeError::Upstream` if the backend fails or returns no choices.
    pub async fn dispatch(
        &self,
        definition: &ModelDefinition,
        fields: &PromptFields,
        params: &PromptParams,
    ) -> Result<CompletionOutcome> {
        let config = definition.configure(params)?;
        let prompt = definition.render(fields, &config)?;
        tracing::debug!(model = definition.name, prompt = %prompt, "Rendered prompt");

        let request = definition.request(prompt, &config)?;

        if let Some(keyword) = blocked_keyword(&request.prompt) {
            tracing::info!(model = definition.name, keyword, "Prompt blocked by safety gate");
            return CompletionOutcome::normalize(request.prompt, decoy_response());
        }

        tracing::debug!(
            payload = %serde_json::to_string(&request).unwrap_or_default(),
            "Sending completion request"
        );
        let response = self.backend.complete(&request).await?;

        let response = match response.first_text().and_then(blocked_keyword) {
            Some(keyword) => {
                tracing::info!(
                    model = definition.name,
                    keyword,
                    "Completion blocked by safety gate"
                );
                decoy_response()
            }
            None => response,
        };

        CompletionOutcome::normalize(request.prompt, response)
    }
}
