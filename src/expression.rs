//! Computed values evaluated against the rewrite context.

use crate::context::{RewriteContext, VAR_REGEX};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A value source evaluated fresh for every message.
///
/// An expression that is a single `${var}` reference yields the variable's
/// value, or nothing when it does not resolve. Any other text is a template
/// whose `${var}` references are interpolated; a template always yields a
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    source: String,
    kind: ExpressionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExpressionKind {
    Variable(String),
    Template,
}

impl Expression {
    /// Parse an expression from configuration text.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let kind = match VAR_REGEX.captures(&source) {
            Some(caps) if caps[0].len() == source.len() => {
                ExpressionKind::Variable(caps[1].to_string())
            }
            _ => ExpressionKind::Template,
        };
        Self { source, kind }
    }

    /// Evaluate against the current message.
    pub fn evaluate(&self, ctx: &RewriteContext) -> Option<String> {
        match &self.kind {
            ExpressionKind::Variable(name) => ctx.resolve(name),
            ExpressionKind::Template => Some(ctx.interpolate(&self.source)),
        }
    }

    /// The original expression text.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestInfo;

    fn make_context() -> RewriteContext {
        let request = RequestInfo::new("POST", [("X-Client", "mobile")]);
        RewriteContext::new(request, "corr-1".to_string()).with_property("version", "2")
    }

    #[test]
    fn test_variable_expression() {
        let ctx = make_context();

        let expr = Expression::new("${request.header.x-client}");
        assert_eq!(expr.evaluate(&ctx), Some("mobile".to_string()));

        let expr = Expression::new("${missing}");
        assert_eq!(expr.evaluate(&ctx), None);
    }

    #[test]
    fn test_template_expression() {
        let ctx = make_context();

        let expr = Expression::new("/api/v${version}/orders");
        assert_eq!(expr.evaluate(&ctx), Some("/api/v2/orders".to_string()));

        let expr = Expression::new("${version}-${missing}");
        assert_eq!(expr.evaluate(&ctx), Some("2-".to_string()));

        let expr = Expression::new("static");
        assert_eq!(expr.evaluate(&ctx), Some("static".to_string()));
    }

    #[test]
    fn test_deserialize() {
        let expr: Expression = serde_json::from_str("\"${request.method}\"").unwrap();
        assert_eq!(expr.as_str(), "${request.method}");
        assert_eq!(expr.evaluate(&make_context()), Some("POST".to_string()));
    }
}
