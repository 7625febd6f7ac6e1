//! Conditional wrapper (`if` / `unless`).

use crate::actions::{Action, Signal};
use crate::conditions::ConditionSet;
use crate::engine::context::RewriteContext;

/// Runs nested actions when its conditions hold.
#[derive(Debug, Clone, Default)]
pub struct Conditional {
    conditions: ConditionSet,
    actions: Vec<Action>,
}

impl Conditional {
    pub fn new(conditions: ConditionSet, actions: Vec<Action>) -> Self {
        Self {
            conditions,
            actions,
        }
    }

    pub fn conditions(&self) -> &ConditionSet {
        &self.conditions
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Skips everything when the conditions fail; otherwise runs the nested
    /// actions in order and returns the first non-`Continue` signal.
    pub fn execute(&self, ctx: &mut RewriteContext) -> Signal {
        if !self.conditions.evaluate(ctx) {
            return Signal::Continue;
        }

        for action in &self.actions {
            let signal = action.execute(ctx);
            if signal != Signal::Continue {
                return signal;
            }
        }

        Signal::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{AddHeader, RewriteAction, SetStatus};
    use crate::conditions::Condition;
    use axum::http::{Method, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Probe {
        calls: AtomicUsize,
    }

    impl RewriteAction for Probe {
        fn execute(&self, _ctx: &mut RewriteContext) -> Signal {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Signal::Continue
        }
    }

    fn on_api(actions: Vec<Action>) -> Conditional {
        Conditional::new(
            ConditionSet::new(false).with(Condition::url("^/api/").unwrap()),
            actions,
        )
    }

    #[test]
    fn test_runs_in_order_and_stops_at_first_terminal() {
        let probe = Arc::new(Probe {
            calls: AtomicUsize::new(0),
        });
        let conditional = on_api(vec![
            Action::AddHeader(AddHeader::new("X-Step", "1")),
            Action::AddHeader(AddHeader::new("X-Step", "2")),
            Action::SetStatus(SetStatus::not_found()),
            Action::Custom(probe.clone()),
        ]);

        let mut ctx = RewriteContext::new(Method::GET, "/api/x");
        assert_eq!(conditional.execute(&mut ctx), Signal::Done);

        let steps: Vec<&str> = ctx.response_headers().iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(steps, vec!["1", "2"]);
        assert_eq!(ctx.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_continue() {
        let conditional = on_api(vec![Action::AddHeader(AddHeader::new("X-A", "1"))]);
        let mut ctx = RewriteContext::new(Method::GET, "/api/x");
        assert_eq!(conditional.execute(&mut ctx), Signal::Continue);
        assert_eq!(ctx.response_headers().len(), 1);
    }

    #[test]
    fn test_false_condition_skips_everything() {
        let conditional = on_api(vec![
            Action::AddHeader(AddHeader::new("X-A", "1")),
            Action::SetStatus(SetStatus::not_found()),
        ]);
        let mut ctx = RewriteContext::new(Method::GET, "/web");
        assert_eq!(conditional.execute(&mut ctx), Signal::Continue);
        assert!(ctx.response_headers().is_empty());
        assert!(ctx.status().is_none());
    }

    #[test]
    fn test_unless() {
        let conditional = Conditional::new(
            ConditionSet::new(true).with(Condition::method("GET,HEAD").unwrap()),
            vec![Action::SetStatus(SetStatus::not_allowed())],
        );

        let mut ctx = RewriteContext::new(Method::GET, "/");
        assert_eq!(conditional.execute(&mut ctx), Signal::Continue);

        let mut ctx = RewriteContext::new(Method::DELETE, "/");
        assert_eq!(conditional.execute(&mut ctx), Signal::Done);
        assert_eq!(ctx.status(), Some(StatusCode::METHOD_NOT_ALLOWED));
    }
}
