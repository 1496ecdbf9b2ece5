//! Caller-supplied prompt fields and typed parameters.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;

use crate::{Result, SkyeError};

/// Named values substituted into a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptFields(BTreeMap<String, String>);

impl PromptFields {
    /// Build fields from a JSON object.
    ///
    /// Strings are taken verbatim; any other value uses its JSON text.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Validation` if `value` is not an object.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| SkyeError::Validation("prompts must be an object".into()))?;

        Ok(object
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect())
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PromptFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Raw per-request parameters, validated per template by
/// [`ModelDefinition::configure`](super::ModelDefinition::configure).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PromptParams {
    /// Temperature mode: `accurate`, `balanced` or `creative`.
    pub mode: Option<String>,
    /// Output language: `en` or `cn`.
    pub lang: Option<String>,
}

impl PromptParams {
    /// Parse parameters from an optional JSON value. `null` and absent are empty.
    ///
    /// # Errors
    ///
    /// Returns `SkyeError::Validation` if the value is not an object of strings.
    pub fn from_json(value: Option<&serde_json::Value>) -> Result<Self> {
        match value {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| SkyeError::Validation(format!("invalid params: {e}"))),
        }
    }
}

/// Temperature mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Temperature 0.
    Accurate,
    /// Temperature 0.5.
    Balanced,
    /// Temperature 1.
    Creative,
}

impl Mode {
    /// Sampling temperature for this mode.
    #[must_use]
    pub const fn temperature(self) -> f64 {
        match self {
            Self::Accurate => 0.0,
            Self::Balanced => 0.5,
            Self::Creative => 1.0,
        }
    }
}

impl FromStr for Mode {
    type Err = SkyeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "accurate" => Ok(Self::Accurate),
            "balanced" => Ok(Self::Balanced),
            "creative" => Ok(Self::Creative),
            other => Err(SkyeError::Validation(format!("unknown mode: {other}"))),
        }
    }
}

/// Output language of bilingual templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    /// English instructions.
    En,
    /// Chinese instructions.
    Cn,
}

impl FromStr for Lang {
    type Err = SkyeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "en" => Ok(Self::En),
            "cn" => Ok(Self::Cn),
            other => Err(SkyeError::Validation(format!("unknown lang: {other}"))),
        }
    }
}

/// Heading level for the thesis outline assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Thesis title.
    Title,
    /// First-level heading.
    H1,
    /// Second-level heading.
    H2,
}

impl Level {
    /// Label of the level the caller supplied content for.
    #[must_use]
    pub const fn current_label(self) -> &'static str {
        match self {
            Self::Title => "题目",
            Self::H1 => "一级标题",
            Self::H2 => "二级标题",
        }
    }

    /// Label of the level the model should produce.
    #[must_use]
    pub const fn next_label(self) -> &'static str {
        match self {
            Self::Title => "一级标题",
            Self::H1 => "二级标题",
            Self::H2 => "三级标题",
        }
    }
}

impl FromStr for Level {
    type Err = SkyeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "title" => Ok(Self::Title),
            "h1" => Ok(Self::H1),
            "h2" => Ok(Self::H2),
            other => Err(SkyeError::Validation(format!("unknown level: {other}"))),
        }
    }
}
