//! URL rewriter: runs the configured rules against a URI.

use crate::action::RewriteError;
use crate::config::RewriteConfig;
use crate::context::RewriteContext;
use crate::fragments::UriFragments;
use crate::rule::{compile_rules, RewriteRule, RuleError};
use tracing::{debug, info, warn};

/// URL rewriter.
///
/// Holds the compiled rules; immutable after construction and safe to share
/// between threads. Each call works on its own [`UriFragments`].
#[derive(Debug, Clone)]
pub struct UrlRewriter {
    /// Configuration
    config: RewriteConfig,
    /// Enabled rules, in declaration order
    rules: Vec<RewriteRule>,
}

impl UrlRewriter {
    /// Create a new rewriter from configuration.
    pub fn new(config: RewriteConfig) -> Result<Self, RuleError> {
        let rules = compile_rules(&config)?;

        info!(
            rules = rules.len(),
            fail_fast = config.settings.fail_fast,
            "URL rewriter initialized"
        );

        Ok(Self { config, rules })
    }

    /// Create from a YAML configuration string.
    pub fn from_yaml(yaml: &str) -> Result<Self, UrlRewriterError> {
        let config: RewriteConfig = serde_yaml::from_str(yaml)?;
        Self::new(config).map_err(UrlRewriterError::from)
    }

    /// Create from a JSON configuration string.
    pub fn from_json(json: &str) -> Result<Self, UrlRewriterError> {
        let config: RewriteConfig = serde_json::from_str(json)?;
        Self::new(config).map_err(UrlRewriterError::from)
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Apply every rule to `fragments`.
    ///
    /// With `fail_fast` the first error is returned. Otherwise a failing
    /// rule is skipped and its partial changes are rolled back.
    pub fn apply(
        &self,
        fragments: &mut UriFragments,
        ctx: &RewriteContext,
    ) -> Result<(), RewriteError> {
        for rule in &self.rules {
            if self.config.settings.fail_fast {
                rule.apply(fragments, ctx)?;
                continue;
            }

            let snapshot = fragments.clone();
            if let Err(e) = rule.apply(fragments, ctx) {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    rule = %rule.name,
                    error = %e,
                    "Rewrite rule failed, skipping"
                );
                *fragments = snapshot;
            }
        }

        Ok(())
    }

    /// Rewrite a URI string.
    pub fn rewrite(&self, uri: &str, ctx: &RewriteContext) -> Result<String, RewriteError> {
        let mut fragments = UriFragments::parse(uri)?;
        self.apply(&mut fragments, ctx)?;
        let rewritten = fragments.to_uri()?;

        debug!(
            correlation_id = %ctx.correlation_id,
            original = uri,
            rewritten = %rewritten,
            "Rewrote URI"
        );

        Ok(rewritten)
    }
}

/// URL rewriter errors.
#[derive(Debug, thiserror::Error)]
pub enum UrlRewriterError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),
}
