//! Property bag assignment.

use crate::actions::Signal;
use crate::engine::context::RewriteContext;
use crate::engine::template::Template;

/// Stores a templated value under a property key.
#[derive(Debug, Clone)]
pub struct SetProperty {
    key: String,
    value: Template,
}

impl SetProperty {
    pub fn new(key: impl Into<String>, value: Template) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Template {
        &self.value
    }

    pub fn execute(&self, ctx: &mut RewriteContext) -> Signal {
        let value = self.value.expand(ctx);
        ctx.set_property(self.key.clone(), value);
        Signal::Continue
    }
}
