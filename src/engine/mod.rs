//! Rule engine.
//!
//! # Data Flow
//! ```text
//! RewriteContext (one per request)
//!     → Rewriter::process
//!         → snapshot of the active RewriterConfiguration
//!         → for each rule: reset last match, execute
//!         → first non-Continue signal ends the walk
//!     → Outcome { signal, intercepted_by }
//! ```
//!
//! # Design Decisions
//! - The active configuration sits behind `ArcSwap`; each request loads one
//!   snapshot and keeps it until done, so a reload never splits a request
//! - Processing is synchronous and cannot fail

pub mod context;
pub mod error_handler;
pub mod template;

use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::Level;

use crate::actions::Signal;
use crate::config::model::RewriterConfiguration;
use crate::observability::metrics;

pub use context::{LastMatch, RewriteContext};
pub use error_handler::{ErrorDisposition, ErrorHandler, RewriteErrorHandler};
pub use template::{Template, TemplateError};

/// Result of running the rule list for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub signal: Signal,
    /// Index of the rule that returned a non-`Continue` signal.
    pub intercepted_by: Option<usize>,
}

impl Outcome {
    /// True when no rule stopped processing.
    pub fn passed_through(&self) -> bool {
        self.intercepted_by.is_none()
    }
}

/// Run `config`'s rules against `ctx` in declaration order.
pub fn process_rules(config: &RewriterConfiguration, ctx: &mut RewriteContext) -> Outcome {
    for (index, rule) in config.rules().iter().enumerate() {
        ctx.reset_last_match();

        let signal = rule.execute(ctx);
        if signal == Signal::Continue {
            continue;
        }

        tracing::debug!(
            rule = index,
            kind = rule.kind(),
            signal = %signal,
            location = %ctx.location(),
            "Rule intercepted request"
        );
        config.logger().log(
            Level::INFO,
            &format!(
                "{} {} intercepted by rule {} ({}): {}",
                ctx.method(),
                ctx.original_url(),
                index,
                rule.kind(),
                signal
            ),
        );
        metrics::record_rule_outcome(rule.kind(), signal);

        return Outcome {
            signal,
            intercepted_by: Some(index),
        };
    }

    Outcome {
        signal: Signal::Continue,
        intercepted_by: None,
    }
}

/// Holds the active configuration and runs requests against it.
#[derive(Debug)]
pub struct Rewriter {
    active: ArcSwap<RewriterConfiguration>,
}

impl Rewriter {
    pub fn new(config: RewriterConfiguration) -> Self {
        Self {
            active: ArcSwap::from_pointee(config),
        }
    }

    /// The configuration requests started now will use.
    pub fn snapshot(&self) -> Arc<RewriterConfiguration> {
        self.active.load_full()
    }

    /// Replace the active configuration. In-flight requests keep their snapshot.
    pub fn swap(&self, config: RewriterConfiguration) {
        let rules = config.rules().len();
        self.active.store(Arc::new(config));
        tracing::info!(rules, "Rewriter configuration activated");
    }

    /// Process one request against the current snapshot.
    pub fn process(&self, ctx: &mut RewriteContext) -> Outcome {
        self.process_with_snapshot(ctx).1
    }

    /// Like `process`, also returning the snapshot the request ran against so
    /// callers can consult its error handlers.
    pub fn process_with_snapshot(
        &self,
        ctx: &mut RewriteContext,
    ) -> (Arc<RewriterConfiguration>, Outcome) {
        let config = self.snapshot();
        let outcome = process_rules(&config, ctx);
        metrics::record_request(outcome.signal);
        (config, outcome)
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new(RewriterConfiguration::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_rules;
    use crate::registry::Registry;
    use axum::http::{Method, StatusCode};

    fn rewriter(rules: &str) -> Rewriter {
        Rewriter::new(parse_rules(rules, &Registry::new()).unwrap())
    }

    #[test]
    fn test_empty_configuration_passes_through() {
        let rewriter = Rewriter::default();
        let mut ctx = RewriteContext::new(Method::GET, "/anything");
        let outcome = rewriter.process(&mut ctx);
        assert_eq!(outcome.signal, Signal::Continue);
        assert!(outcome.passed_through());
    }

    #[test]
    fn test_first_intercepting_rule_wins() {
        let rewriter = rewriter(
            r#"
            [[element]]
            name = "add"
            attributes = { header = "X-Seen", value = "1" }

            [[element]]
            name = "forbidden"

            [[element]]
            name = "not-found"
            "#,
        );
        let mut ctx = RewriteContext::new(Method::GET, "/");
        let outcome = rewriter.process(&mut ctx);
        assert_eq!(outcome.signal, Signal::Done);
        assert_eq!(outcome.intercepted_by, Some(1));
        assert_eq!(ctx.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(ctx.response_header("x-seen"), Some("1"));
    }

    #[test]
    fn test_stop_still_reports_rewritten_location() {
        let rewriter = rewriter(
            r#"
            [[element]]
            name = "rewrite"
            attributes = { url = "^/shop/(.*)$", to = "/store/$1", processing = "stop" }

            [[element]]
            name = "not-found"
            "#,
        );
        let mut ctx = RewriteContext::new(Method::GET, "/shop/hats");
        let outcome = rewriter.process(&mut ctx);
        assert_eq!(outcome.signal, Signal::Stop);
        assert_eq!(ctx.location(), "/store/hats");
        assert_eq!(ctx.status(), None);
    }

    #[test]
    fn test_swap_keeps_existing_snapshot() {
        let rewriter = rewriter("[[element]]\nname = \"gone\"");
        let before = rewriter.snapshot();

        rewriter.swap(RewriterConfiguration::default());

        assert_eq!(before.rules().len(), 1);
        assert!(rewriter.snapshot().rules().is_empty());
    }

    #[test]
    fn test_process_returns_the_snapshot_it_used() {
        let rewriter = rewriter(
            r#"
            [[element]]
            name = "error-handler"
            attributes = { code = 410, url = "/errors/gone.html" }

            [[element]]
            name = "gone"
            "#,
        );
        let mut ctx = RewriteContext::new(Method::GET, "/");
        let (config, outcome) = rewriter.process_with_snapshot(&mut ctx);

        rewriter.swap(RewriterConfiguration::default());

        assert_eq!(outcome.signal, Signal::Done);
        assert!(config.error_handler(StatusCode::GONE).is_some());
        assert!(rewriter.snapshot().error_handler(StatusCode::GONE).is_none());
    }
}
