//! Zentinel Rewrite Agent CLI entry point.
//!
//! Loads a rewrite configuration and rewrites a single URI.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zentinel_agent_rewrite::{RequestInfo, RewriteConfig, RewriteContext, UrlRewriter};

#[derive(Parser, Debug)]
#[command(name = "zentinel-agent-rewrite")]
#[command(author, version, about = "URL rewrite agent for Zentinel")]
struct Args {
    /// URI to rewrite
    uri: Option<String>,

    /// Configuration file path (YAML or JSON)
    #[arg(short, long, env = "REWRITE_CONFIG")]
    config: Option<PathBuf>,

    /// Message property (name=value), repeatable
    #[arg(short, long = "property", value_name = "NAME=VALUE")]
    properties: Vec<String>,

    /// Request header (name=value), repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME=VALUE")]
    headers: Vec<String>,

    /// Request method
    #[arg(long, default_value = "GET")]
    method: String,

    /// Correlation ID used in logs
    #[arg(long, default_value = "cli")]
    correlation_id: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print example configuration and exit.
    #[arg(long)]
    example_config: bool,

    /// Validate configuration and exit.
    #[arg(long)]
    validate: bool,
}

fn print_example_config() {
    let example = r#"# Rewrite Agent Configuration Example
version: "1"

settings:
  # Stop at the first failing rule
  fail_fast: true

rules:
  # Route API v1 calls to the v2 backend
  - name: "api-v1-to-v2"
    description: "Rewrite API v1 paths to v2"
    enabled: true
    actions:
      - fragment: host
        value: "backend.internal"
      - fragment: port
        value: "8080"
      - fragment: path
        type: replace
        regex: "^/api/v1/"
        value: "/api/v2/"

  # Drop the debug flag and tag the client
  - name: "query-cleanup"
    actions:
      - fragment: query
        type: remove_query_param
        value: "debug"
      - fragment: query
        type: append
        expression: "client=${request.header.x-client-id}"

  # Resolve {name} placeholders from message properties
  - name: "user-path"
    enabled: false
    actions:
      - fragment: path
        value: "/users/{user_id}/profile"
        resolve: true
"#;
    println!("{}", example);
}

/// Split `name=value` pairs.
fn parse_pairs(pairs: &[String], what: &str) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
            _ => bail!("Invalid {} (expected NAME=VALUE): {}", what, pair),
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // Print example config if requested
    if args.example_config {
        print_example_config();
        return Ok(());
    }

    // Load configuration
    let config = if let Some(config_path) = &args.config {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        if config_path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        }
    } else {
        RewriteConfig::default()
    };

    let rewriter = UrlRewriter::new(config).context("Invalid rewrite configuration")?;

    // Validate only if requested
    if args.validate {
        info!(rules = rewriter.rules().len(), "Configuration is valid");
        return Ok(());
    }

    let uri = args
        .uri
        .as_deref()
        .context("No URI given (pass it as the first argument)")?;

    let properties: HashMap<String, String> = parse_pairs(&args.properties, "property")?
        .into_iter()
        .collect();
    let headers = parse_pairs(&args.headers, "header")?;

    let ctx = RewriteContext::new(RequestInfo::new(&args.method, headers), args.correlation_id)
        .with_properties(properties);

    info!(config = ?args.config, uri, "Rewriting URI");

    let rewritten = rewriter
        .rewrite(uri, &ctx)
        .with_context(|| format!("Failed to rewrite URI: {}", uri))?;

    println!("{}", rewritten);

    Ok(())
}
