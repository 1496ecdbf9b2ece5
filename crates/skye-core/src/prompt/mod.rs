//! Prompt templates and dispatch preparation.
//!
//! A [`TemplateRegistry`] maps public model names (`"dict"`, `"thesis"`, ...)
//! to [`ModelDefinition`]s. A definition validates the caller's parameters
//! into a [`RenderConfig`], renders the caller's fields into a prompt string,
//! and packages the prompt into a [`CompletionRequest`](crate::CompletionRequest)
//! with a token budget.

mod budget;
mod definition;
mod format;
mod params;
mod registry;

pub use budget::{estimate_tokens, output_token_budget, MAX_CONTEXT_TOKENS, TOKENS_PER_CHAR};
pub use definition::{ModelDefinition, RenderConfig, Template, TemplateBody, TemperaturePolicy};
pub use format::render_format;
pub use params::{Lang, Level, Mode, PromptFields, PromptParams};
pub use registry::{TemplateRegistry, DEFAULT_UPSTREAM_MODEL};
