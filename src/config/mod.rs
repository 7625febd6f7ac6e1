//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! server config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → ServerConfig
//!
//! rules file (TOML element tree)
//!     → loader.rs (deserialize into RulesDocument)
//!     → reader.rs (dispatch elements, resolve types via the registry)
//!     → validation.rs (attribute checks, ConfigurationError)
//!     → RewriterConfiguration (model.rs, immutable)
//!     → shared via ArcSwap with the request path
//!
//! On change:
//!     watcher.rs detects change
//!     → full reload against the host registry
//!     → atomic swap on success, current snapshot kept on failure
//! ```
//!
//! # Design Decisions
//! - The rewriter configuration is immutable once loaded; changes require a full reload
//! - All server settings have defaults to allow minimal configs
//! - Rule semantics live in the parsers; the schema is only an element tree

pub mod loader;
pub mod model;
pub mod reader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_rules, parse_rules, ConfigError};
pub use model::RewriterConfiguration;
pub use schema::{ConfigElement, RulesDocument, ServerConfig};
pub use validation::ConfigurationError;
