//! URL rewriting engine.
//!
//! Rules are loaded from a declarative element tree into an immutable
//! `RewriterConfiguration`, then evaluated per request by the `Rewriter`.
//! Hosts extend the rule vocabulary by binding type identifiers in the
//! `Registry` before loading.

// Core engine
pub mod actions;
pub mod conditions;
pub mod engine;
pub mod transforms;

// Configuration & extensibility
pub mod config;
pub mod parsers;
pub mod registry;

// Hosting & cross-cutting concerns
pub mod http;
pub mod observability;

pub use actions::{Action, Signal};
pub use conditions::{Condition, ConditionSet};
pub use config::{ConfigError, ConfigurationError, RewriterConfiguration, ServerConfig};
pub use engine::{Outcome, RewriteContext, Rewriter};
pub use http::HttpServer;
pub use registry::{Capability, Component, Registry, RegistryError};
pub use transforms::Transform;
