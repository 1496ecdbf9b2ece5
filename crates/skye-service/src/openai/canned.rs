//! Fixed-reply backend for tests and local development.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use skye_core::{CompletionRequest, CompletionResponse, Result, TokenUsage};

use crate::dispatcher::CompletionBackend;

/// Backend that answers every request with the same response.
///
/// The default reply is `Hi!` / `stop` with usage 10 / 90 / 100.
#[derive(Debug)]
pub struct CannedBackend {
    response: CompletionResponse,
    calls: AtomicUsize,
}

impl CannedBackend {
    /// A backend with the default reply.
    #[must_use]
    pub fn new() -> Self {
        Self::with_response(CompletionResponse::single(
            "Hi!",
            "stop",
            TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 90,
                total_tokens: 100,
            },
        ))
    }

    /// A backend with a custom reply.
    #[must_use]
    pub fn with_response(response: CompletionResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for CannedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for CannedBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(model = %request.model, "Canned completion");
        Ok(self.response.clone())
    }
}
