//! Pattern match conditions.
//!
//! # Responsibilities
//! - Derive the string to test from the request (URL, method, property, header)
//! - Match it against a compiled, case-insensitive regex
//! - Publish captures to the context's last-match slot on success
//!
//! # Design Decisions
//! - A failed or impossible match is `false`, never an error
//! - Absent properties and headers short-circuit to `false` without matching
//! - Method lists (`GET,HEAD`) compile to an anchored alternation

use regex::{Regex, RegexBuilder};
use std::fmt;

use crate::engine::context::{LastMatch, RewriteContext};

/// The request attribute a pattern is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSubject {
    /// Current location (path and query).
    Url,
    /// Request method.
    Method,
    /// Named entry in the property bag.
    Property(String),
    /// Named request header.
    Header(String),
}

impl MatchSubject {
    fn value<'a>(&self, ctx: &'a RewriteContext) -> Option<&'a str> {
        match self {
            MatchSubject::Url => Some(ctx.location()),
            MatchSubject::Method => Some(ctx.method().as_str()),
            MatchSubject::Property(name) => ctx.property(name),
            MatchSubject::Header(name) => ctx.request_header(name),
        }
    }
}

impl fmt::Display for MatchSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchSubject::Url => f.write_str("url"),
            MatchSubject::Method => f.write_str("method"),
            MatchSubject::Property(name) => write!(f, "property '{}'", name),
            MatchSubject::Header(name) => write!(f, "header '{}'", name),
        }
    }
}

/// A compiled pattern over one request attribute.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    subject: MatchSubject,
    pattern: Regex,
}

impl PatternMatch {
    pub fn new(subject: MatchSubject, pattern: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { subject, pattern })
    }

    /// Match the request method against a comma-separated list.
    pub fn method(methods: &str) -> Result<Self, regex::Error> {
        let alternatives = methods
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        Self::new(MatchSubject::Method, &format!("^(?:{})$", alternatives))
    }

    pub fn subject(&self) -> &MatchSubject {
        &self.subject
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Evaluate; on success the captures replace the context's last match.
    pub fn is_match(&self, ctx: &mut RewriteContext) -> bool {
        let last_match = {
            let Some(value) = self.subject.value(ctx) else {
                return false;
            };
            match self.pattern.captures(value) {
                Some(caps) => LastMatch::from_captures(&self.pattern, &caps),
                None => return false,
            }
        };

        ctx.set_last_match(last_match);
        true
    }
}
