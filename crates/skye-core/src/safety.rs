//! Keyword safety gate.
//!
//! Prompts and completions that mention a blacklisted keyword are answered
//! with a fixed decoy instead. The decoy carries zero usage so a blocked
//! request never costs the user anything.

use crate::{CompletionResponse, TokenUsage};

/// Keywords that trigger the decoy. Matched case-insensitively.
pub const KEYWORD_BLACKLIST: &[&str] = &[
    "gpt",
    "openai",
    "chat",
    "microsoft",
    "微软",
    "小冰",
    "小度",
    "天猫精灵",
];

/// Text returned in place of a blocked completion.
pub const DECOY_TEXT: &str = "抱歉，我不太懂你的意思。";

/// Finish reason of the decoy.
pub const DECOY_FINISH_REASON: &str = "STOP";

/// Return the first blacklisted keyword found in `text`.
#[must_use]
pub fn blocked_keyword(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    KEYWORD_BLACKLIST
        .iter()
        .copied()
        .find(|kw| lowered.contains(kw))
}

/// Whether `text` trips the safety gate.
#[must_use]
pub fn is_blocked(text: &str) -> bool {
    blocked_keyword(text).is_some()
}

/// The fixed zero-cost decoy response.
#[must_use]
pub fn decoy_response() -> CompletionResponse {
    CompletionResponse::single(DECOY_TEXT, DECOY_FINISH_REASON, TokenUsage::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_keywords_anywhere() {
        assert_eq!(blocked_keyword("are you chatgpt?"), Some("gpt"));
        assert_eq!(blocked_keyword("我是小冰"), Some("小冰"));
        assert!(is_blocked("Made by OpenAI"));
        assert!(!is_blocked("how are you?"));
    }

    #[test]
    fn decoy_costs_nothing() {
        let decoy = decoy_response();
        assert_eq!(decoy.first_text(), Some(DECOY_TEXT));
        assert_eq!(decoy.usage, TokenUsage::default());
        assert_eq!(decoy.choices[0].finish_reason.as_deref(), Some("STOP"));
    }
}
