//! Configuration types for the Rewrite agent.

use crate::action::ActionKind;
use crate::expression::Expression;
use crate::fragments::FragmentTarget;
use serde::{Deserialize, Serialize};

/// Main configuration for the Rewrite agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Configuration version
    pub version: String,
    /// Global settings
    pub settings: Settings,
    /// Rewrite rules (applied in declaration order)
    pub rules: Vec<RuleConfig>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            settings: Settings::default(),
            rules: vec![],
        }
    }
}

/// Global settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Abort the rewrite at the first failing rule. When disabled, a failing
    /// rule is skipped and its partial changes are discarded.
    pub fail_fast: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { fail_fast: true }
    }
}

/// A rewrite rule: an ordered list of actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Rule name (for logging/debugging)
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: String,
    /// Whether the rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Actions, applied in order
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

fn default_true() -> bool {
    true
}

/// A single rewrite action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionConfig {
    /// URI fragment the action changes
    #[serde(default)]
    pub fragment: FragmentTarget,
    /// What to do with the fragment
    #[serde(default, rename = "type")]
    pub kind: ActionKind,
    /// Literal value
    #[serde(default)]
    pub value: Option<String>,
    /// Computed value (takes precedence over `value`)
    #[serde(default, alias = "xpath")]
    pub expression: Option<Expression>,
    /// Pattern for `replace`
    #[serde(default)]
    pub regex: Option<String>,
    /// Substitute `{name}` placeholders with message properties
    #[serde(default)]
    pub resolve: bool,
}
