//! Replacement templates for REPLACE actions.
//!
//! Configured templates use `$n` group references that stop at the last
//! digit still naming an existing group, so `$1px` is group 1 followed by
//! `px`. `\` escapes the next character. `${name}` names a group. The regex
//! crate reads `$1px` as a group called `1px`, so templates are rewritten
//! into its `${n}` / `$$` form before use.

/// Rewrite `template` for `Regex::replace_all` on a regex with `groups`
/// capture groups (not counting the whole match).
pub(super) fn expand_template(template: &str, groups: usize) -> String {
    let mut out = String::with_capacity(template.len() + 4);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('$') => out.push_str("$$"),
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            },
            '$' => match chars.peek().copied() {
                Some('{') => out.push('$'),
                Some(d) if d.is_ascii_digit() => {
                    chars.next();
                    let mut group = d.to_digit(10).unwrap_or(0) as usize;
                    while let Some(next) = chars.peek().and_then(|n| n.to_digit(10)) {
                        let extended = group * 10 + next as usize;
                        if extended > groups {
                            break;
                        }
                        group = extended;
                        chars.next();
                    }
                    out.push_str(&format!("${{{}}}", group));
                }
                _ => out.push_str("$$"),
            },
            _ => out.push(c),
        }
    }

    out
}
