//! The frozen rewriter configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::StatusCode;

use crate::actions::Action;
use crate::engine::error_handler::ErrorHandler;
use crate::observability::logging::{RewriteLogger, TracingLogger};
use crate::transforms::TransformTable;

/// Everything a load produced. Never mutated after construction; a reload
/// builds a new one.
#[derive(Debug, Clone)]
pub struct RewriterConfiguration {
    rules: Vec<Action>,
    transforms: TransformTable,
    error_handlers: BTreeMap<u16, ErrorHandler>,
    default_documents: Vec<String>,
    logger: Arc<dyn RewriteLogger>,
}

impl RewriterConfiguration {
    pub(crate) fn new(
        rules: Vec<Action>,
        transforms: TransformTable,
        error_handlers: BTreeMap<u16, ErrorHandler>,
        default_documents: Vec<String>,
        logger: Arc<dyn RewriteLogger>,
    ) -> Self {
        Self {
            rules,
            transforms,
            error_handlers,
            default_documents,
            logger,
        }
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[Action] {
        &self.rules
    }

    pub fn transforms(&self) -> &TransformTable {
        &self.transforms
    }

    /// `None` only when no transform is named `name`.
    pub fn apply_transform(&self, name: &str, input: &str) -> Option<String> {
        self.transforms.apply(name, input)
    }

    pub fn error_handler(&self, status: StatusCode) -> Option<&ErrorHandler> {
        self.error_handlers.get(&status.as_u16())
    }

    pub fn error_handlers(&self) -> &BTreeMap<u16, ErrorHandler> {
        &self.error_handlers
    }

    pub fn default_documents(&self) -> &[String] {
        &self.default_documents
    }

    pub fn logger(&self) -> &Arc<dyn RewriteLogger> {
        &self.logger
    }
}

impl Default for RewriterConfiguration {
    /// No rules: every request passes through untouched.
    fn default() -> Self {
        Self::new(
            Vec::new(),
            TransformTable::new(),
            BTreeMap::new(),
            Vec::new(),
            Arc::new(TracingLogger),
        )
    }
}
