//! Query string helpers.

use regex::Regex;

/// Put `param` in front of `query`, `&`-separated when `query` is not empty.
pub(super) fn prepend(query: &str, param: &str) -> String {
    if query.is_empty() {
        param.to_string()
    } else {
        format!("{}&{}", param, query)
    }
}

/// Put `param` after `query`, `&`-separated when `query` is not empty.
pub(super) fn append(query: &str, param: &str) -> String {
    if query.is_empty() {
        param.to_string()
    } else {
        format!("{}&{}", query, param)
    }
}

/// Remove the first `name=...` pair from `query`.
///
/// `name` is a regex. The pair removed is the first one in which
/// `<name>=.*` finds a match; later pairs are kept in order. With no name
/// nothing is removed. Trailing empty pairs are always dropped.
pub(super) fn remove_param(query: &str, name: Option<&str>) -> Result<String, regex::Error> {
    if query.is_empty() {
        return Ok(String::new());
    }

    let mut params: Vec<&str> = query.split('&').collect();
    while params.last().is_some_and(|p| p.is_empty()) {
        params.pop();
    }

    if let Some(name) = name {
        let pattern = Regex::new(&format!("{}=.*", name))?;
        if let Some(pos) = params.iter().position(|p| pattern.is_match(p)) {
            params.remove(pos);
        }
    }

    Ok(params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepend_append() {
        assert_eq!(prepend("a=1", "b=2"), "b=2&a=1");
        assert_eq!(prepend("", "b=2"), "b=2");
        assert_eq!(append("a=1", "b=2"), "a=1&b=2");
        assert_eq!(append("", "b=2"), "b=2");
    }

    #[test]
    fn test_remove_param() {
        assert_eq!(remove_param("a=1&b=2&a=3", Some("a")).unwrap(), "b=2&a=3");
        assert_eq!(remove_param("b=2&c=3", Some("a")).unwrap(), "b=2&c=3");
        assert_eq!(remove_param("", Some("a")).unwrap(), "");
        assert_eq!(remove_param("a=1&b=2&", Some("b")).unwrap(), "a=1");
        assert_eq!(remove_param("flag&a=1", Some("a")).unwrap(), "flag");
    }

    #[test]
    fn test_remove_param_name_is_pattern() {
        assert_eq!(
            remove_param("utm_source=x&utm_medium=y&id=7", Some("utm_\\w+")).unwrap(),
            "utm_medium=y&id=7"
        );
        assert!(remove_param("a=1", Some("(")).is_err());
    }

    #[test]
    fn test_remove_param_without_name() {
        assert_eq!(remove_param("a=1&b=2", None).unwrap(), "a=1&b=2");
        assert_eq!(remove_param("a=1&", None).unwrap(), "a=1");
        assert_eq!(remove_param("a=1&&", Some("zz")).unwrap(), "a=1");
        assert_eq!(remove_param("", None).unwrap(), "");
    }
}
