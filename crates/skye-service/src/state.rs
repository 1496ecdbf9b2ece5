//! Application state.

use std::sync::Arc;
use std::time::Duration;

use skye_core::TemplateRegistry;
use skye_store::Store;

use crate::config::ServiceConfig;
use crate::dispatcher::{CompletionBackend, Dispatcher};
use crate::ledger::Ledger;
use crate::openai::{CannedBackend, OpenAiClient};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Credit ledger over `store`.
    pub ledger: Ledger,

    /// Prompt dispatcher.
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Uses the `OpenAI` client when an API key is configured and canned
    /// completions otherwise.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let openai = config.openai_api_key.as_ref().and_then(|key| {
            match OpenAiClient::new(
                &config.openai_base_url,
                key,
                Duration::from_secs(config.completion_timeout_seconds),
            ) {
                Ok(client) => {
                    tracing::info!(base_url = %config.openai_base_url, "OpenAI integration enabled");
                    Some(client)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create OpenAI client");
                    None
                }
            }
        });

        let backend: Arc<dyn CompletionBackend> = match openai {
            Some(client) => Arc::new(client),
            None => {
                tracing::warn!("OpenAI not configured - serving canned completions");
                Arc::new(CannedBackend::new())
            }
        };

        Self::with_backend(store, config, backend)
    }

    /// Create a state around an explicit completion backend.
    #[must_use]
    pub fn with_backend(
        store: Arc<dyn Store>,
        config: ServiceConfig,
        backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        let ledger = Ledger::new(Arc::clone(&store), config.gift_amount);
        let registry = Arc::new(TemplateRegistry::builtin());
        tracing::debug!(templates = registry.len(), "Template registry loaded");

        Self {
            store,
            config,
            ledger,
            dispatcher: Dispatcher::new(registry, backend),
        }
    }
}
