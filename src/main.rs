//! url-rewriter server.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id → trace → timeout → rewrite middleware ──▶ application
//!                                                        │
//!                                  Done (redirect, 404…) ◀┘
//!
//!     rules file ──▶ loader ──▶ RewriterConfiguration ──▶ ArcSwap snapshot
//!          ▲                                                  ▲
//!          └──── notify watcher (optional) ── reload ─────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use url_rewriter::config::watcher::RulesWatcher;
use url_rewriter::config::{load_config, load_rules, RewriterConfiguration, ServerConfig};
use url_rewriter::observability::{logging, metrics};
use url_rewriter::{HttpServer, Registry, Rewriter};

#[derive(Parser)]
#[command(name = "url-rewriter")]
#[command(about = "HTTP request rewriting server", long_about = None)]
struct Args {
    /// Server configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rules file; overrides `rewriter.rules_file`.
    #[arg(short, long)]
    rules: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(rules) = args.rules {
        config.rewriter.rules_file = Some(rules);
    }

    logging::init_logging(&config.observability);
    tracing::info!("url-rewriter v{} starting", env!("CARGO_PKG_VERSION"));

    let registry = Registry::new();
    let rules = match &config.rewriter.rules_file {
        Some(path) => match load_rules(path, &registry) {
            Ok(rules) => rules,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to load rules");
                return Err(e.into());
            }
        },
        None => {
            tracing::warn!("No rules file configured, requests pass through unchanged");
            RewriterConfiguration::default()
        }
    };

    // The watcher stops when dropped, so it lives until main returns.
    let (_watcher, updates) = match (config.rewriter.watch, &config.rewriter.rules_file) {
        (true, Some(path)) => {
            let (watcher, rx) = RulesWatcher::new(path, registry.clone());
            (Some(watcher.run()?), Some(rx))
        }
        _ => (None, None),
    };

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        request_timeout_secs = config.timeouts.request_secs,
        "Listening for connections"
    );

    let rewriter = Arc::new(Rewriter::new(rules));
    let server = HttpServer::new(config, rewriter);
    server.run(listener, updates).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
