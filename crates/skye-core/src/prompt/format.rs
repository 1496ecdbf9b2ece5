//! Named-placeholder substitution.

use super::PromptFields;
use crate::{Result, SkyeError};

/// Substitute `{name}` placeholders in `template` from `fields`.
///
/// `{{` and `}}` produce literal braces. Fields not referenced by the
/// template are ignored.
///
/// # Errors
///
/// Returns `SkyeError::Validation` for a missing field, an empty placeholder,
/// or an unbalanced brace.
pub fn render_format(template: &str, fields: &PromptFields) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => {
                            return Err(SkyeError::Validation(format!(
                                "unbalanced brace in template near {{{name}"
                            )));
                        }
                        Some(ch) => name.push(ch),
                    }
                }
                if name.is_empty() {
                    return Err(SkyeError::Validation(
                        "positional placeholders are not supported".into(),
                    ));
                }
                let value = fields
                    .get(&name)
                    .ok_or_else(|| SkyeError::Validation(format!("missing field: {name}")))?;
                out.push_str(value);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(SkyeError::Validation(
                    "unbalanced closing brace in template".into(),
                ));
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}
