//! Rewrite context for variable resolution and interpolation.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex for matching variable expressions like ${...}
pub(crate) static VAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Per-message state available while rewriting.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    /// Request information
    pub request: RequestInfo,
    /// Named runtime properties of the message
    pub properties: HashMap<String, String>,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Correlation ID
    pub correlation_id: String,
}

/// Request information for context.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    /// HTTP method
    pub method: String,
    /// Request headers (names lower-cased)
    pub headers: HashMap<String, Vec<String>>,
}

impl RewriteContext {
    /// Create a new rewrite context.
    pub fn new(request: RequestInfo, correlation_id: String) -> Self {
        Self {
            request,
            properties: HashMap::new(),
            timestamp: chrono::Utc::now(),
            correlation_id,
        }
    }

    /// Replace the message properties.
    pub fn with_properties(mut self, properties: HashMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    /// Set a single message property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Look up a named message property.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Resolve a variable expression.
    ///
    /// Supports:
    /// - `${property.name}` or `${name}` - Message property
    /// - `${request.method}` - HTTP method
    /// - `${request.header.X-Custom}` - Request header value
    /// - `${correlation_id}` - Correlation ID
    /// - `${now}` - Current timestamp (RFC 3339)
    pub fn resolve(&self, expr: &str) -> Option<String> {
        let parts: Vec<&str> = expr.splitn(2, '.').collect();

        match parts[0] {
            "request" => self.resolve_request(parts.get(1).unwrap_or(&"")),
            "property" => {
                let name = parts.get(1)?;
                self.property(name).map(str::to_string)
            }
            "correlation_id" => Some(self.correlation_id.clone()),
            "now" => Some(self.timestamp.to_rfc3339()),
            _ => self.property(expr).map(str::to_string),
        }
    }

    /// Interpolate all ${...} variables in a string.
    ///
    /// Variables that do not resolve are replaced with the empty string.
    pub fn interpolate(&self, template: &str) -> String {
        VAR_REGEX
            .replace_all(template, |caps: &regex::Captures| {
                let var_name = &caps[1];
                self.resolve(var_name).unwrap_or_default()
            })
            .to_string()
    }

    fn resolve_request(&self, path: &str) -> Option<String> {
        let parts: Vec<&str> = path.splitn(2, '.').collect();

        match parts[0] {
            "method" => Some(self.request.method.clone()),
            "header" => {
                let name = parts.get(1)?;
                self.request.header(name).map(str::to_string)
            }
            _ => None,
        }
    }
}

impl RequestInfo {
    /// Create request info from a method and raw header pairs.
    pub fn new<I, K, V>(method: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            map.entry(name.as_ref().to_lowercase())
                .or_default()
                .push(value.into());
        }

        Self {
            method: method.into(),
            headers: map,
        }
    }

    /// Get a single header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|v| v.first())
            .map(|s| s.as_str())
    }
}
