//! Action pipeline.
//!
//! # Data Flow
//! ```text
//! Action::execute(&mut RewriteContext)
//!     → mutate context (status, headers, properties, location)
//!     → Signal
//!         Continue: keep evaluating later rules
//!         Stop:     no more rules, request still goes downstream
//!         Done:     response fully determined by the engine
//! ```
//!
//! # Design Decisions
//! - Closed enum of built-in actions; `Custom` only arrives via the registry
//! - Actions never fail at request time

pub mod conditional;
pub mod headers;
pub mod property;
pub mod redirect;
pub mod rewrite;
pub mod status;

use std::fmt;
use std::sync::Arc;

use crate::engine::context::RewriteContext;

pub use conditional::Conditional;
pub use headers::AddHeader;
pub use property::SetProperty;
pub use redirect::Redirect;
pub use rewrite::Rewrite;
pub use status::SetStatus;

/// Outcome of executing an action or a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Continue,
    Stop,
    Done,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Continue => "continue",
            Signal::Stop => "stop",
            Signal::Done => "done",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action supplied by the host through the registry.
pub trait RewriteAction: Send + Sync + fmt::Debug {
    fn execute(&self, ctx: &mut RewriteContext) -> Signal;
}

/// A context-mutating operation.
#[derive(Debug, Clone)]
pub enum Action {
    AddHeader(AddHeader),
    SetStatus(SetStatus),
    Redirect(Redirect),
    Rewrite(Rewrite),
    SetProperty(SetProperty),
    Conditional(Conditional),
    Custom(Arc<dyn RewriteAction>),
}

impl Action {
    pub fn execute(&self, ctx: &mut RewriteContext) -> Signal {
        match self {
            Action::AddHeader(action) => action.execute(ctx),
            Action::SetStatus(action) => action.execute(ctx),
            Action::Redirect(action) => action.execute(ctx),
            Action::Rewrite(action) => action.execute(ctx),
            Action::SetProperty(action) => action.execute(ctx),
            Action::Conditional(action) => action.execute(ctx),
            Action::Custom(action) => action.execute(ctx),
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::AddHeader(_) => "add-header",
            Action::SetStatus(_) => "set-status",
            Action::Redirect(_) => "redirect",
            Action::Rewrite(_) => "rewrite",
            Action::SetProperty(_) => "set-property",
            Action::Conditional(_) => "conditional",
            Action::Custom(_) => "custom",
        }
    }
}

impl From<AddHeader> for Action {
    fn from(action: AddHeader) -> Self {
        Action::AddHeader(action)
    }
}

impl From<SetStatus> for Action {
    fn from(action: SetStatus) -> Self {
        Action::SetStatus(action)
    }
}

impl From<Redirect> for Action {
    fn from(action: Redirect) -> Self {
        Action::Redirect(action)
    }
}

impl From<Rewrite> for Action {
    fn from(action: Rewrite) -> Self {
        Action::Rewrite(action)
    }
}

impl From<SetProperty> for Action {
    fn from(action: SetProperty) -> Self {
        Action::SetProperty(action)
    }
}

impl From<Conditional> for Action {
    fn from(action: Conditional) -> Self {
        Action::Conditional(action)
    }
}
