use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use url_rewriter::config::load_rules;
use url_rewriter::{RewriteContext, Registry, Rewriter, RewriterConfiguration};

#[derive(Parser)]
#[command(name = "rewrite-cli")]
#[command(
    about = "Validate rewriter rules and try them against sample requests",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a rules file and summarise it
    Check {
        rules: PathBuf,
    },
    /// Run one request through a rules file
    Eval {
        rules: PathBuf,

        /// Request URL (path and query)
        url: String,

        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request header as `name:value`; repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Check { rules } => load(&rules).map(|config| summary(&config)),
        Commands::Eval {
            rules,
            url,
            method,
            headers,
        } => load(&rules).and_then(|config| evaluate(config, &url, &method, &headers)),
    };

    match result {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn load(path: &Path) -> Result<RewriterConfiguration, String> {
    load_rules(path, &Registry::new()).map_err(|e| format!("{}: {}", path.display(), e))
}

fn summary(config: &RewriterConfiguration) -> Value {
    let mut transforms: Vec<&str> = config.transforms().names().collect();
    transforms.sort_unstable();

    json!({
        "rules": config.rules().iter().map(|rule| rule.kind()).collect::<Vec<_>>(),
        "transforms": transforms,
        "error_handlers": config.error_handlers().keys().collect::<Vec<_>>(),
        "default_documents": config.default_documents(),
    })
}

fn evaluate(
    config: RewriterConfiguration,
    url: &str,
    method: &str,
    headers: &[String],
) -> Result<Value, String> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|e| format!("invalid method '{}': {}", method, e))?;
    let mut ctx = RewriteContext::new(method, url).with_headers(parse_headers(headers)?);

    let outcome = Rewriter::new(config).process(&mut ctx);

    let response_headers: Vec<Value> = ctx
        .response_headers()
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();

    Ok(json!({
        "signal": outcome.signal.as_str(),
        "intercepted_by": outcome.intercepted_by,
        "status": ctx.status().map(|s| s.as_u16()),
        "location": ctx.location(),
        "rewritten": ctx.is_rewritten(),
        "headers": response_headers,
        "properties": ctx.properties(),
    }))
}

fn parse_headers(raw: &[String]) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();
    for entry in raw {
        let (name, value) = entry
            .split_once(':')
            .ok_or_else(|| format!("header '{}' is not in name:value form", entry))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| format!("invalid header name '{}': {}", name, e))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|e| format!("invalid header value for '{}': {}", name, e))?;
        headers.append(name, value);
    }
    Ok(headers)
}
