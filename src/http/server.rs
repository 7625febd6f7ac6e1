//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the rewrite middleware in front of the
//!   downstream handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Apply reloaded rewriter configurations as they arrive
//! - Serve until Ctrl+C

use axum::{
    body::Body,
    extract::Extension,
    http::Request,
    middleware,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{RewriterConfiguration, ServerConfig};
use crate::engine::Rewriter;
use crate::http::middleware::{rewrite_middleware, RewriteProperties, RewriteState};

/// HTTP server hosting the rewriter.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    rewriter: Arc<Rewriter>,
}

impl HttpServer {
    pub fn new(config: ServerConfig, rewriter: Arc<Rewriter>) -> Self {
        let router = Self::build_router(&config, rewriter.clone());
        Self {
            router,
            config,
            rewriter,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, rewriter: Arc<Rewriter>) -> Router {
        let state = RewriteState { rewriter };

        Router::new()
            .fallback(echo_handler)
            .layer(middleware::from_fn_with_state(state, rewrite_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configurations received on `updates` replace the active one.
    pub async fn run(
        self,
        listener: TcpListener,
        updates: Option<mpsc::UnboundedReceiver<RewriterConfiguration>>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some(mut updates) = updates {
            let rewriter = self.rewriter.clone();
            tokio::spawn(async move {
                while let Some(config) = updates.recv().await {
                    rewriter.swap(config);
                }
            });
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Downstream stand-in: echoes what reached the application.
async fn echo_handler(
    properties: Option<Extension<RewriteProperties>>,
    request: Request<Body>,
) -> Json<Value> {
    let properties = properties.map(|Extension(p)| p.0).unwrap_or_default();

    Json(json!({
        "method": request.method().as_str(),
        "uri": request.uri().to_string(),
        "properties": properties,
    }))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
