//! Token budgeting.

use crate::{Result, SkyeError};

/// Context window shared by prompt and completion.
pub const MAX_CONTEXT_TOKENS: i64 = 4096;

/// Estimated tokens per character. Deliberately pessimistic for CJK text and
/// applied to every character alike.
pub const TOKENS_PER_CHAR: i64 = 3;

/// Cheap token estimate: character count times three.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn estimate_tokens(text: &str) -> i64 {
    text.chars().count() as i64 * TOKENS_PER_CHAR
}

/// Tokens left for the completion after the prompt estimate.
///
/// # Errors
///
/// Returns `SkyeError::PromptTooLong` if fewer than one token would remain.
pub fn output_token_budget(prompt: &str) -> Result<i64> {
    let estimated = estimate_tokens(prompt);
    let budget = MAX_CONTEXT_TOKENS - estimated;
    if budget < 1 {
        return Err(SkyeError::PromptTooLong {
            estimated,
            limit: MAX_CONTEXT_TOKENS,
        });
    }
    Ok(budget)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_counts_characters_not_bytes() {
        assert_eq!(estimate_tokens("你好"), 6);
        assert_eq!(estimate_tokens("Hello"), 15);
        assert_eq!(estimate_tokens("Hi你好"), 12);
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn budget_is_window_minus_estimate() {
        assert_eq!(output_token_budget("Hello").unwrap(), 4096 - 15);
    }

    #[test]
    fn budget_rejects_prompts_that_fill_the_window() {
        let prompt = "a".repeat(1366);
        let err = output_token_budget(&prompt).unwrap_err();
        assert!(matches!(
            err,
            SkyeError::PromptTooLong {
                estimated: 4098,
                limit: 4096
            }
        ));

        let prompt = "a".repeat(1365);
        assert_eq!(output_token_budget(&prompt).unwrap(), 1);
    }
}
