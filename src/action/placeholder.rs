//! `{name}` placeholder resolution.

use crate::context::RewriteContext;
use regex::Regex;
use std::sync::LazyLock;
use tracing::error;

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").unwrap());

/// Substitute every `{name}` in `value` with the message property `name`.
///
/// A single placeholder without a non-empty property invalidates the whole
/// value: the result is then the empty string.
pub fn resolve_placeholders(value: &str, ctx: &RewriteContext) -> String {
    let mut resolved = value.to_string();
    let mut unresolved = false;

    for caps in PLACEHOLDER_REGEX.captures_iter(value) {
        let name = &caps[1];
        match ctx.property(name).filter(|v| !v.is_empty()) {
            Some(property) => resolved = resolved.replace(&caps[0], property),
            None => {
                error!(
                    correlation_id = %ctx.correlation_id,
                    placeholder = name,
                    value,
                    "Path parameter was not found in the message properties"
                );
                unresolved = true;
            }
        }
    }

    if unresolved {
        String::new()
    } else {
        resolved
    }
}
