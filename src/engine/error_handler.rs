//! Error handlers keyed by status code.
//!
//! When a rule ends a request with a status that has a handler, the hosting
//! middleware asks the handler what to serve instead of an empty response.

use axum::http::StatusCode;
use std::fmt;
use std::sync::Arc;

use crate::engine::context::RewriteContext;

/// What the host should do for an intercepted error status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// Serve this internal URL from the application, keeping the status.
    Transfer(String),
    /// Respond with the bare status.
    Status,
}

/// An error handler supplied by the host through the registry.
pub trait RewriteErrorHandler: Send + Sync + fmt::Debug {
    fn handle(&self, status: StatusCode, ctx: &RewriteContext) -> ErrorDisposition;
}

#[derive(Debug, Clone)]
pub enum ErrorHandler {
    /// Built-in handler for `<error-handler url="...">`.
    RedirectToUrl(String),
    Custom(Arc<dyn RewriteErrorHandler>),
}

impl ErrorHandler {
    pub fn handle(&self, status: StatusCode, ctx: &RewriteContext) -> ErrorDisposition {
        match self {
            ErrorHandler::RedirectToUrl(url) => ErrorDisposition::Transfer(url.clone()),
            ErrorHandler::Custom(handler) => handler.handle(status, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[derive(Debug)]
    struct ByMethod;

    impl RewriteErrorHandler for ByMethod {
        fn handle(&self, status: StatusCode, ctx: &RewriteContext) -> ErrorDisposition {
            if ctx.method() == Method::GET {
                ErrorDisposition::Transfer(format!("/errors/{}", status.as_u16()))
            } else {
                ErrorDisposition::Status
            }
        }
    }

    #[test]
    fn test_redirect_to_url() {
        let ctx = RewriteContext::new(Method::GET, "/missing");
        let handler = ErrorHandler::RedirectToUrl("/not-found.html".into());
        assert_eq!(
            handler.handle(StatusCode::NOT_FOUND, &ctx),
            ErrorDisposition::Transfer("/not-found.html".into())
        );
    }

    #[test]
    fn test_custom_handler() {
        let handler = ErrorHandler::Custom(Arc::new(ByMethod));
        let get = RewriteContext::new(Method::GET, "/");
        let post = RewriteContext::new(Method::POST, "/");
        assert_eq!(
            handler.handle(StatusCode::GONE, &get),
            ErrorDisposition::Transfer("/errors/410".into())
        );
        assert_eq!(handler.handle(StatusCode::GONE, &post), ErrorDisposition::Status);
    }
}
