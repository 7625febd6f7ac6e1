//! Condition evaluation.
//!
//! # Data Flow
//! ```text
//! RewriteContext (location, method, headers, properties)
//!     → pattern.rs (derive attribute, regex match, publish captures)
//!     → ConditionSet (AND in declaration order, optional negation)
//!     → bool gating an action
//! ```
//!
//! # Design Decisions
//! - Conditions are a closed enum; custom ones only arrive via the registry
//! - No state outside the context's last-match slot
//! - Conjunction short-circuits on the first false condition

pub mod pattern;

use std::fmt;
use std::sync::Arc;

use crate::engine::context::RewriteContext;

pub use pattern::{MatchSubject, PatternMatch};

/// A condition supplied by the host through the registry.
pub trait RewriteCondition: Send + Sync + fmt::Debug {
    fn is_match(&self, ctx: &mut RewriteContext) -> bool;
}

/// A boolean predicate over the rewrite context.
#[derive(Debug, Clone)]
pub enum Condition {
    Pattern(PatternMatch),
    Custom(Arc<dyn RewriteCondition>),
}

impl Condition {
    pub fn url(pattern: &str) -> Result<Self, regex::Error> {
        PatternMatch::new(MatchSubject::Url, pattern).map(Condition::Pattern)
    }

    pub fn method(methods: &str) -> Result<Self, regex::Error> {
        PatternMatch::method(methods).map(Condition::Pattern)
    }

    pub fn property(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        PatternMatch::new(MatchSubject::Property(name.into()), pattern).map(Condition::Pattern)
    }

    pub fn header(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        PatternMatch::new(MatchSubject::Header(name.into()), pattern).map(Condition::Pattern)
    }

    pub fn is_match(&self, ctx: &mut RewriteContext) -> bool {
        match self {
            Condition::Pattern(pattern) => pattern.is_match(ctx),
            Condition::Custom(custom) => custom.is_match(ctx),
        }
    }
}

/// Conditions combined by conjunction, optionally negated ("unless").
#[derive(Debug, Clone, Default)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
    negate: bool,
}

impl ConditionSet {
    pub fn new(negate: bool) -> Self {
        Self {
            conditions: Vec::new(),
            negate,
        }
    }

    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn is_negated(&self) -> bool {
        self.negate
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// AND of all conditions in order, inverted when negated. An empty set is
    /// true (false when negated).
    pub fn evaluate(&self, ctx: &mut RewriteContext) -> bool {
        let all = self.conditions.iter().all(|c| c.is_match(ctx));
        all != self.negate
    }
}
