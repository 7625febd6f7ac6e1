//! Extensibility registry.
//!
//! # Data Flow
//! ```text
//! Host startup:
//!     Registry::new()                 built-in parsers + transforms + "tracing" logger
//!     .with_type("Acme.Parser", f)    host-supplied identifier → factory bindings
//!
//! Configuration load (config::reader):
//!     clone of the host registry
//!     → <register parser|transform|logger="id"> → resolve(id, capability)
//!     → <mapping> → add_transform
//!     → rule elements → action_parsers(tag)
//! ```
//!
//! # Design Decisions
//! - Identifiers resolve only through explicit bindings; unknown is a load error
//! - A load works on its own copy, so the host registry never changes after
//!   startup and concurrent requests never observe a half-registered parser
//! - One component may provide several capabilities at once

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::engine::error_handler::RewriteErrorHandler;
use crate::observability::logging::{RewriteLogger, TracingLogger};
use crate::parsers::{self, ActionParser, ConditionParser};
use crate::transforms::{RewriteTransform, Transform, TransformTable};

/// What a resolved component must be able to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ActionParser,
    ConditionParser,
    Transform,
    Logger,
    ErrorHandler,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ActionParser => "action parser",
            Capability::ConditionParser => "condition parser",
            Capability::Transform => "transform",
            Capability::Logger => "logger",
            Capability::ErrorHandler => "error handler",
        };
        f.write_str(name)
    }
}

/// Identifier resolution failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("type '{0}' is not registered")]
    UnknownType(String),

    #[error("type '{identifier}' does not provide the {capability} capability")]
    CapabilityMismatch {
        identifier: String,
        capability: Capability,
    },
}

/// An activated component: the capabilities one registered type provides.
#[derive(Debug, Clone, Default)]
pub struct Component {
    pub action_parser: Option<Arc<dyn ActionParser>>,
    pub condition_parser: Option<Arc<dyn ConditionParser>>,
    pub transform: Option<Arc<dyn RewriteTransform>>,
    pub logger: Option<Arc<dyn RewriteLogger>>,
    pub error_handler: Option<Arc<dyn RewriteErrorHandler>>,
}

impl Component {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action_parser(mut self, parser: impl ActionParser + 'static) -> Self {
        self.action_parser = Some(Arc::new(parser));
        self
    }

    pub fn with_condition_parser(mut self, parser: impl ConditionParser + 'static) -> Self {
        self.condition_parser = Some(Arc::new(parser));
        self
    }

    pub fn with_transform(mut self, transform: impl RewriteTransform + 'static) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn with_logger(mut self, logger: impl RewriteLogger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    pub fn with_error_handler(mut self, handler: impl RewriteErrorHandler + 'static) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    pub fn provides(&self, capability: Capability) -> bool {
        match capability {
            Capability::ActionParser => self.action_parser.is_some(),
            Capability::ConditionParser => self.condition_parser.is_some(),
            Capability::Transform => self.transform.is_some(),
            Capability::Logger => self.logger.is_some(),
            Capability::ErrorHandler => self.error_handler.is_some(),
        }
    }
}

/// Builds a fresh component each time a configuration activates the type.
pub type ComponentFactory = Arc<dyn Fn() -> Component + Send + Sync>;

/// Identifier bindings plus the parser and transform tables a load starts from.
#[derive(Clone)]
pub struct Registry {
    types: HashMap<String, ComponentFactory>,
    action_parsers: HashMap<String, Vec<Arc<dyn ActionParser>>>,
    condition_parsers: Vec<Arc<dyn ConditionParser>>,
    transforms: TransformTable,
}

impl Registry {
    /// Registry with every built-in parser and transform, and the `tracing`
    /// logger type.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        for parser in parsers::builtin_action_parsers() {
            registry.add_action_parser(parser);
        }
        for parser in parsers::builtin_condition_parsers() {
            registry.add_condition_parser(parser);
        }
        for transform in Transform::builtins() {
            registry.add_transform(transform);
        }

        registry.with_type("tracing", || Component::new().with_logger(TracingLogger))
    }

    /// Registry with nothing pre-registered.
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
            action_parsers: HashMap::new(),
            condition_parsers: Vec::new(),
            transforms: TransformTable::new(),
        }
    }

    /// Bind a type identifier to a factory. Later bindings replace earlier ones.
    pub fn with_type<F>(mut self, identifier: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Component + Send + Sync + 'static,
    {
        self.types.insert(identifier.into(), Arc::new(factory));
        self
    }

    pub fn has_type(&self, identifier: &str) -> bool {
        self.types.contains_key(identifier)
    }

    /// Construct the component bound to `identifier`.
    pub fn activate(&self, identifier: &str) -> Result<Component, RegistryError> {
        self.types
            .get(identifier)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::UnknownType(identifier.to_string()))
    }

    /// Construct the component and check it provides `capability`.
    pub fn resolve(
        &self,
        identifier: &str,
        capability: Capability,
    ) -> Result<Component, RegistryError> {
        let component = self.activate(identifier)?;
        if component.provides(capability) {
            Ok(component)
        } else {
            Err(RegistryError::CapabilityMismatch {
                identifier: identifier.to_string(),
                capability,
            })
        }
    }

    /// Append a parser candidate for the element it claims.
    pub fn add_action_parser(&mut self, parser: Arc<dyn ActionParser>) {
        self.action_parsers
            .entry(parser.name().to_string())
            .or_default()
            .push(parser);
    }

    /// Candidates for an element name, in registration order.
    pub fn action_parsers(&self, element: &str) -> &[Arc<dyn ActionParser>] {
        self.action_parsers
            .get(element)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn add_condition_parser(&mut self, parser: Arc<dyn ConditionParser>) {
        self.condition_parsers.push(parser);
    }

    pub fn condition_parsers(&self) -> &[Arc<dyn ConditionParser>] {
        &self.condition_parsers
    }

    /// Add under the transform's name; the last one registered wins.
    pub fn add_transform(&mut self, transform: Transform) -> Option<Transform> {
        self.transforms.insert(transform)
    }

    pub fn transforms(&self) -> &TransformTable {
        &self.transforms
    }

    pub(crate) fn into_transforms(self) -> TransformTable {
        self.transforms
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.types.keys().map(String::as_str).collect();
        types.sort_unstable();
        let mut elements: Vec<&str> = self.action_parsers.keys().map(String::as_str).collect();
        elements.sort_unstable();

        f.debug_struct("Registry")
            .field("types", &types)
            .field("action_parsers", &elements)
            .field("condition_parsers", &self.condition_parsers.len())
            .field("transforms", &self.transforms.len())
            .finish()
    }
}
