//! Response header annotation.

use crate::actions::Signal;
use crate::engine::context::RewriteContext;

/// Appends a literal header to the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddHeader {
    name: String,
    value: String,
}

impl AddHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn execute(&self, ctx: &mut RewriteContext) -> Signal {
        ctx.add_response_header(self.name.clone(), self.value.clone());
        Signal::Continue
    }
}
