//! Server-side URL rewriting.

use crate::actions::Signal;
use crate::conditions::ConditionSet;
use crate::engine::context::RewriteContext;
use crate::engine::template::Template;

/// Replaces the request location before it reaches the application.
///
/// Unlike a redirect the client never sees the new URL. `stop` controls
/// whether later rules still run against the rewritten location.
#[derive(Debug, Clone)]
pub struct Rewrite {
    conditions: ConditionSet,
    target: Template,
    stop: bool,
}

impl Rewrite {
    pub fn new(target: Template, stop: bool) -> Self {
        Self {
            conditions: ConditionSet::default(),
            target,
            stop,
        }
    }

    pub fn with_conditions(mut self, conditions: ConditionSet) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn target(&self) -> &Template {
        &self.target
    }

    pub fn stops_processing(&self) -> bool {
        self.stop
    }

    pub fn execute(&self, ctx: &mut RewriteContext) -> Signal {
        if !self.conditions.evaluate(ctx) {
            return Signal::Continue;
        }

        let location = self.target.expand(ctx);
        ctx.set_location(location);
        if self.stop {
            Signal::Stop
        } else {
            Signal::Continue
        }
    }
}
