//! Rewrite actions.
//!
//! A [`RewriteAction`] changes one fragment of a [`UriFragments`] container,
//! or replaces the whole URI. Actions are compiled once from configuration
//! and applied to every message; they hold no per-message state.

mod placeholder;
mod query;
mod replacement;

pub use placeholder::resolve_placeholders;

use crate::config::ActionConfig;
use crate::context::RewriteContext;
use crate::expression::Expression;
use crate::fragments::{FragmentTarget, UriFragments, UriSyntaxError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Action kind as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Replace the fragment with the new value
    #[default]
    Set,
    /// Add the new value after the current one
    Append,
    /// Add the new value before the current one
    Prepend,
    /// Regex replace-all over the current value
    Replace,
    /// Clear the fragment
    Remove,
    /// Drop the first `name=value` pair from the query
    RemoveQueryParam,
    /// A kind this version does not know. Applied as [`ActionKind::Set`].
    #[serde(other)]
    Unrecognized,
}

/// A compiled action operation.
#[derive(Debug, Clone)]
pub enum Operation {
    Set,
    Append,
    Prepend,
    Replace(Regex),
    Remove,
    RemoveQueryParam,
}

impl Operation {
    /// The configuration kind this operation was compiled from.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Set => ActionKind::Set,
            Self::Append => ActionKind::Append,
            Self::Prepend => ActionKind::Prepend,
            Self::Replace(_) => ActionKind::Replace,
            Self::Remove => ActionKind::Remove,
            Self::RemoveQueryParam => ActionKind::RemoveQueryParam,
        }
    }
}

/// A single URI rewrite action.
#[derive(Debug, Clone)]
pub struct RewriteAction {
    target: FragmentTarget,
    operation: Operation,
    value: Option<String>,
    expression: Option<Expression>,
    resolve: bool,
}

impl RewriteAction {
    /// Create an action without a value source. Its computed value is absent
    /// until [`with_value`](Self::with_value) or
    /// [`with_expression`](Self::with_expression) is used.
    pub fn new(target: FragmentTarget, operation: Operation) -> Self {
        Self {
            target,
            operation,
            value: None,
            expression: None,
            resolve: false,
        }
    }

    /// Compile an action from configuration.
    pub fn compile(config: &ActionConfig) -> Result<Self, ActionError> {
        let operation = match config.kind {
            ActionKind::Replace => {
                let pattern = config.regex.as_deref().ok_or(ActionError::MissingRegex)?;
                Operation::Replace(Regex::new(pattern)?)
            }
            ActionKind::Append => Operation::Append,
            ActionKind::Prepend => Operation::Prepend,
            ActionKind::Remove => Operation::Remove,
            ActionKind::RemoveQueryParam => Operation::RemoveQueryParam,
            // Unknown kinds assign the value verbatim.
            ActionKind::Set | ActionKind::Unrecognized => Operation::Set,
        };

        Ok(Self {
            target: config.fragment,
            operation,
            value: config.value.clone(),
            expression: config.expression.clone(),
            resolve: config.resolve,
        })
    }

    /// Use a literal value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Use a computed value. Takes precedence over a literal value.
    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expression = Some(expression);
        self
    }

    /// Enable `{name}` placeholder resolution.
    pub fn with_resolve(mut self, resolve: bool) -> Self {
        self.resolve = resolve;
        self
    }

    pub fn target(&self) -> FragmentTarget {
        self.target
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Compute the new value for this message.
    fn compute_value(&self, ctx: &RewriteContext) -> Option<String> {
        match &self.expression {
            Some(expression) => expression.evaluate(ctx),
            None => self.value.clone(),
        }
    }

    /// Apply the action to `fragments`.
    ///
    /// Fails when the full URI or port value cannot be parsed; the container
    /// is left unchanged in that case.
    pub fn apply(
        &self,
        fragments: &mut UriFragments,
        ctx: &RewriteContext,
    ) -> Result<(), RewriteError> {
        let result = self.compute_value(ctx);

        match self.target {
            // The full URI is always replaced, whatever the operation.
            FragmentTarget::FullUri => {
                trace!(uri = ?result, "Setting the URI");
                fragments.reset(result.as_deref().unwrap_or(""))?;
            }
            FragmentTarget::Port => {
                trace!(port = ?result, "Setting the port");
                fragments.set(FragmentTarget::Port, result)?;
            }
            target => {
                let current = fragments.get(target).unwrap_or_default();
                let mut value = self.rewrite(target, &current, result)?;

                if self.resolve {
                    value = value.map(|v| resolve_placeholders(&v, ctx));
                }

                trace!(
                    fragment = %target,
                    kind = ?self.operation.kind(),
                    value = ?value,
                    "Setting fragment"
                );
                fragments.set(target, value)?;
            }
        }

        Ok(())
    }

    /// Compute the new fragment value from the current one.
    fn rewrite(
        &self,
        target: FragmentTarget,
        current: &str,
        result: Option<String>,
    ) -> Result<Option<String>, RewriteError> {
        let is_query = target == FragmentTarget::Query;

        let value = match &self.operation {
            Operation::Prepend => Some(match result {
                Some(r) if is_query => query::prepend(current, &r),
                Some(r) => r + current,
                None => String::new(),
            }),
            Operation::Append => Some(match result {
                Some(r) if is_query => query::append(current, &r),
                Some(r) => format!("{}{}", current, r),
                None => String::new(),
            }),
            Operation::Replace(regex) => Some(match result {
                Some(r) => {
                    let template = replacement::expand_template(&r, regex.captures_len() - 1);
                    regex.replace_all(current, template.as_str()).into_owned()
                }
                None => String::new(),
            }),
            Operation::Remove => None,
            Operation::RemoveQueryParam => Some(
                query::remove_param(current, result.as_deref()).map_err(|source| {
                    RewriteError::InvalidPattern {
                        pattern: result.unwrap_or_default(),
                        source,
                    }
                })?,
            ),
            Operation::Set => result,
        };

        Ok(value)
    }
}

/// Errors raised while compiling an action.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("A replace action requires a regex")]
    MissingRegex,
}

/// Errors raised while applying an action.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("URI syntax error: {0}")]
    Syntax(#[from] UriSyntaxError),

    #[error("Invalid query parameter pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
