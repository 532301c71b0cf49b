//! Rewrite rules: named, ordered lists of actions.

use crate::action::{ActionError, RewriteAction, RewriteError};
use crate::config::{RewriteConfig, RuleConfig};
use crate::context::RewriteContext;
use crate::fragments::UriFragments;
use std::collections::HashSet;
use tracing::{debug, trace};

/// A compiled rewrite rule.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    /// Rule name
    pub name: String,
    /// Actions, applied in declaration order
    actions: Vec<RewriteAction>,
}

impl RewriteRule {
    /// Compile a rule from configuration.
    pub fn compile(config: &RuleConfig) -> Result<Self, RuleError> {
        if config.name.trim().is_empty() {
            return Err(RuleError::EmptyName);
        }

        let actions = config
            .actions
            .iter()
            .enumerate()
            .map(|(index, action)| {
                RewriteAction::compile(action).map_err(|source| RuleError::Action {
                    rule: config.name.clone(),
                    index,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: config.name.clone(),
            actions,
        })
    }

    /// Create a rule from already built actions.
    pub fn new(name: impl Into<String>, actions: Vec<RewriteAction>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }

    pub fn actions(&self) -> &[RewriteAction] {
        &self.actions
    }

    /// Apply every action in order. Stops at the first failing action.
    pub fn apply(
        &self,
        fragments: &mut UriFragments,
        ctx: &RewriteContext,
    ) -> Result<(), RewriteError> {
        for (index, action) in self.actions.iter().enumerate() {
            trace!(
                rule = %self.name,
                action = index,
                fragment = %action.target(),
                "Applying rewrite action"
            );
            action.apply(fragments, ctx)?;
        }

        debug!(
            correlation_id = %ctx.correlation_id,
            rule = %self.name,
            actions = self.actions.len(),
            "Applied rewrite rule"
        );
        Ok(())
    }
}

/// Compile every enabled rule of a configuration, keeping declaration order.
pub fn compile_rules(config: &RewriteConfig) -> Result<Vec<RewriteRule>, RuleError> {
    let mut seen = HashSet::new();
    let mut rules = Vec::with_capacity(config.rules.len());

    for rule_config in &config.rules {
        if !seen.insert(rule_config.name.as_str()) {
            return Err(RuleError::DuplicateRule(rule_config.name.clone()));
        }
        if !rule_config.enabled {
            debug!(rule = %rule_config.name, "Skipping disabled rule");
            continue;
        }
        rules.push(RewriteRule::compile(rule_config)?);
    }

    Ok(rules)
}

/// Errors that can occur during rule compilation.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Rule '{rule}', action {index}: {source}")]
    Action {
        rule: String,
        index: usize,
        #[source]
        source: ActionError,
    },

    #[error("Rule name must not be empty")]
    EmptyName,

    #[error("Duplicate rule name: {0}")]
    DuplicateRule(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionKind, Operation};
    use crate::config::ActionConfig;
    use crate::context::RequestInfo;
    use crate::fragments::FragmentTarget;

    fn rule_config(name: &str, actions: Vec<ActionConfig>) -> RuleConfig {
        RuleConfig {
            name: name.to_string(),
            description: String::new(),
            enabled: true,
            actions,
        }
    }

    #[test]
    fn test_compile_rule() {
        let config = rule_config(
            "to-backend",
            vec![
                ActionConfig {
                    fragment: FragmentTarget::Host,
                    value: Some("backend".to_string()),
                    ..Default::default()
                },
                ActionConfig {
                    fragment: FragmentTarget::Port,
                    value: Some("9000".to_string()),
                    ..Default::default()
                },
            ],
        );
        let rule = RewriteRule::compile(&config).unwrap();
        assert_eq!(rule.name, "to-backend");
        assert_eq!(rule.actions().len(), 2);
    }

    #[test]
    fn test_compile_errors() {
        let config = rule_config("", vec![]);
        assert!(matches!(
            RewriteRule::compile(&config),
            Err(RuleError::EmptyName)
        ));

        let config = rule_config(
            "bad",
            vec![
                ActionConfig::default(),
                ActionConfig {
                    kind: ActionKind::Replace,
                    ..Default::default()
                },
            ],
        );
        let err = RewriteRule::compile(&config).unwrap_err();
        assert!(matches!(
            err,
            RuleError::Action {
                index: 1,
                source: ActionError::MissingRegex,
                ..
            }
        ));
        assert!(err.to_string().contains("'bad', action 1"));
    }

    #[test]
    fn test_compile_rules_order_and_duplicates() {
        let mut disabled = rule_config("off", vec![]);
        disabled.enabled = false;

        let config = RewriteConfig {
            rules: vec![rule_config("first", vec![]), disabled, rule_config("second", vec![])],
            ..Default::default()
        };
        let rules = compile_rules(&config).unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);

        let config = RewriteConfig {
            rules: vec![rule_config("dup", vec![]), rule_config("dup", vec![])],
            ..Default::default()
        };
        assert!(matches!(
            compile_rules(&config),
            Err(RuleError::DuplicateRule(name)) if name == "dup"
        ));
    }

    #[test]
    fn test_apply_in_order() {
        let rule = RewriteRule::new(
            "ordered",
            vec![
                RewriteAction::new(FragmentTarget::Path, Operation::Set).with_value("/a"),
                RewriteAction::new(FragmentTarget::Path, Operation::Append).with_value("/b"),
                RewriteAction::new(FragmentTarget::Path, Operation::Prepend).with_value("/c"),
            ],
        );
        let ctx = RewriteContext::new(RequestInfo::default(), "test".to_string());
        let mut fragments = UriFragments::parse("http://h/x").unwrap();
        rule.apply(&mut fragments, &ctx).unwrap();
        assert_eq!(fragments.path(), Some("/c/a/b"));
    }
}
