//! URL Rewrite Agent for Zentinel.
//!
//! This agent rewrites request URIs one fragment at a time:
//!
//! - Replace the full URI, or change a single fragment (scheme, user info,
//!   host, port, path, query, ref)
//! - Set, append, prepend, regex replace, remove
//! - Remove a single query parameter
//! - Values from literals or `${...}` expressions over message state
//! - `{name}` placeholder resolution from message properties
//!
//! ## Configuration Example
//!
//! ```yaml
//! rules:
//!   - name: "api-v1-to-v2"
//!     actions:
//!       - fragment: path
//!         type: replace
//!         regex: "^/api/v1/"
//!         value: "/api/v2/"
//!       - fragment: query
//!         type: remove_query_param
//!         value: "debug"
//! ```

pub mod action;
pub mod config;
pub mod context;
pub mod expression;
pub mod fragments;
pub mod rewriter;
pub mod rule;

pub use action::{ActionKind, Operation, RewriteAction, RewriteError};
pub use config::RewriteConfig;
pub use context::{RequestInfo, RewriteContext};
pub use expression::Expression;
pub use fragments::{FragmentTarget, UriFragments, UriSyntaxError};
pub use rewriter::{UrlRewriter, UrlRewriterError};
pub use rule::{RewriteRule, RuleError};
