//! Template definitions.

use std::borrow::Cow;

use super::{output_token_budget, render_format, Lang, Level, Mode, PromptFields, PromptParams};
use crate::{CompletionRequest, Result, SkyeError};

/// A prompt template: one format string, or lines joined with `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// A single format string.
    Single(&'static str),
    /// Ordered format-string lines.
    Lines(&'static [&'static str]),
}

impl Template {
    /// The full format string.
    #[must_use]
    pub fn source(&self) -> Cow<'static, str> {
        match self {
            Self::Single(s) => Cow::Borrowed(s),
            Self::Lines(lines) => Cow::Owned(lines.join("\n")),
        }
    }

    /// Render with the given fields.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Validation` if a referenced field is missing.
    pub fn render(&self, fields: &PromptFields) -> Result<String> {
        render_format(&self.source(), fields)
    }
}

/// How a definition chooses its template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateBody {
    /// Always the same template.
    Plain(Template),
    /// Selected by the `lang` parameter.
    ByLang {
        /// English variant.
        en: Template,
        /// Chinese variant.
        cn: Template,
    },
    /// Derives `current_level` and `next_level` from a `level` field.
    OutlineLevels(Template),
}

/// Whether the `mode` parameter may override the default temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperaturePolicy {
    /// The default temperature is always used; `mode` is ignored.
    Fixed,
    /// `mode` selects the temperature when present.
    ModeSelectable,
}

/// Validated per-request configuration of a definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// Sampling temperature.
    pub temperature: f64,
    /// Selected language, for bilingual templates.
    pub lang: Option<Lang>,
}

/// A registered model: template plus dispatch settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinition {
    /// Public model name used by callers.
    pub name: &'static str,
    /// Versioned identifier persisted with each usage record.
    pub codename: &'static str,
    /// Upstream model identifier.
    pub model: &'static str,
    /// Template selection.
    pub body: TemplateBody,
    /// Default temperature.
    pub temperature: f64,
    /// Temperature override policy.
    pub policy: TemperaturePolicy,
    /// Restricted to VIP users.
    pub vip_only: bool,
}

impl ModelDefinition {
    /// A fixed-temperature, single-template definition.
    #[must_use]
    pub const fn plain(
        name: &'static str,
        codename: &'static str,
        model: &'static str,
        template: Template,
        temperature: f64,
    ) -> Self {
        Self {
            name,
            codename,
            model,
            body: TemplateBody::Plain(template),
            temperature,
            policy: TemperaturePolicy::Fixed,
            vip_only: false,
        }
    }

    /// Allow `mode` to override the temperature.
    #[must_use]
    pub const fn mode_selectable(mut self) -> Self {
        self.policy = TemperaturePolicy::ModeSelectable;
        self
    }

    /// Restrict to VIP users.
    #[must_use]
    pub const fn vip_only(mut self) -> Self {
        self.vip_only = true;
        self
    }

    /// Replace the template body.
    #[must_use]
    pub const fn with_body(mut self, body: TemplateBody) -> Self {
        self.body = body;
        self
    }

    /// Validate request parameters against this definition.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Validation` for an unknown `mode` on a
    /// mode-selectable definition, or a missing/unknown `lang` on a
    /// bilingual one.
    pub fn configure(&self, params: &PromptParams) -> Result<RenderConfig> {
        let temperature = match (self.policy, params.mode.as_deref()) {
            (TemperaturePolicy::ModeSelectable, Some(mode)) => mode.parse::<Mode>()?.temperature(),
            _ => self.temperature,
        };

        let lang = match self.body {
            TemplateBody::ByLang { .. } => {
                let raw = params.lang.as_deref().ok_or_else(|| {
                    SkyeError::Validation(format!("model {} requires lang", self.name))
                })?;
                Some(raw.parse::<Lang>()?)
            }
            _ => None,
        };

        Ok(RenderConfig { temperature, lang })
    }

    /// Render the prompt for this request.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Validation` for missing fields or an unknown `level`.
    pub fn render(&self, fields: &PromptFields, config: &RenderConfig) -> Result<String> {
        match self.body {
            TemplateBody::Plain(template) => template.render(fields),
            TemplateBody::ByLang { en, cn } => match config.lang {
                Some(Lang::En) => en.render(fields),
                Some(Lang::Cn) => cn.render(fields),
                None => Err(SkyeError::Validation(format!(
                    "model {} requires lang",
                    self.name
                ))),
            },
            TemplateBody::OutlineLevels(template) => {
                let mut fields = fields.clone();
                let level: Level = fields
                    .remove("level")
                    .ok_or_else(|| SkyeError::Validation("missing field: level".into()))?
                    .parse()?;
                fields.insert("current_level", level.current_label());
                fields.insert("next_level", level.next_label());
                template.render(&fields)
            }
        }
    }

    /// Package a rendered prompt into an upstream request.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::PromptTooLong` if the prompt leaves no output budget.
    pub fn request(&self, prompt: String, config: &RenderConfig) -> Result<CompletionRequest> {
        let max_tokens = output_token_budget(&prompt)?;
        Ok(CompletionRequest {
            model: self.model.to_string(),
            prompt,
            temperature: config.temperature,
            max_tokens,
        })
    }
}
