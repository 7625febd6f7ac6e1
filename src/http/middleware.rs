//! Rewrite middleware.
//!
//! Adapts an axum request to a `RewriteContext`, runs the rule pipeline once
//! and acts on the outcome:
//! - `Done`: the engine answers (status and headers), unless an error handler
//!   for that status transfers the request to another URL
//! - `Continue` / `Stop`: the request goes downstream with the rewritten URI
//!   and the rule properties attached; queued headers are added to the response

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::actions::Signal;
use crate::engine::{ErrorDisposition, RewriteContext, Rewriter};

/// State shared with the middleware.
#[derive(Clone)]
pub struct RewriteState {
    pub rewriter: Arc<Rewriter>,
}

/// Properties set by the rules, attached to requests that go downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteProperties(pub HashMap<String, String>);

impl RewriteProperties {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

pub async fn rewrite_middleware(
    State(state): State<RewriteState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let mut ctx = RewriteContext::from_request(&req);
    let (config, outcome) = state.rewriter.process_with_snapshot(&mut ctx);

    if outcome.signal == Signal::Done {
        let status = ctx.status().unwrap_or(StatusCode::OK);

        if let Some(handler) = config.error_handler(status) {
            if let ErrorDisposition::Transfer(url) = handler.handle(status, &ctx) {
                tracing::debug!(status = %status, url = %url, "Transferring to error handler");
                if set_uri(&mut req, &url) {
                    let mut response = next.run(req).await;
                    *response.status_mut() = status;
                    append_headers(response.headers_mut(), ctx.response_headers());
                    return response;
                }
            }
        }

        let mut response = status.into_response();
        append_headers(response.headers_mut(), ctx.response_headers());
        return response;
    }

    if ctx.is_rewritten() {
        tracing::debug!(from = %ctx.original_url(), to = %ctx.location(), "Request rewritten");
        set_uri(&mut req, ctx.location());
    }
    req.extensions_mut()
        .insert(RewriteProperties(ctx.properties().clone()));

    let mut response = next.run(req).await;
    append_headers(response.headers_mut(), ctx.response_headers());
    response
}

fn set_uri(req: &mut Request<Body>, location: &str) -> bool {
    match location.parse::<Uri>() {
        Ok(uri) => {
            *req.uri_mut() = uri;
            true
        }
        Err(e) => {
            warn!(location = %location, error = %e, "Rewritten location is not a valid URI");
            false
        }
    }
}

fn append_headers(headers: &mut HeaderMap, queued: &[(String, String)]) {
    for (name, value) in queued {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => warn!(header = %name, "Skipping invalid response header"),
        }
    }
}
