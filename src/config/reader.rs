//! Builds a `RewriterConfiguration` from the element tree.
//!
//! # Responsibilities
//! - Dispatch top-level elements by name (`error-handler`, `default-documents`,
//!   `register`, `mapping`, anything else is a rule)
//! - Resolve registered type identifiers through the registry
//! - Produce the configuration only if every element was accepted
//!
//! # Design Decisions
//! - Works on a clone of the host registry; `register` and `mapping` only
//!   affect elements that come after them
//! - The first error aborts the load and nothing built so far escapes

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::actions::Action;
use crate::config::model::RewriterConfiguration;
use crate::config::schema::ConfigElement;
use crate::config::validation::{parse_status, ConfigurationError, ElementExt};
use crate::engine::error_handler::ErrorHandler;
use crate::observability::logging::{RewriteLogger, TracingLogger};
use crate::parsers::parse_action;
use crate::registry::{Capability, Component, Registry, RegistryError};
use crate::transforms::{StaticMapping, Transform};

/// Read every top-level element, in order, into a new configuration.
pub fn read_configuration(
    elements: &[ConfigElement],
    registry: &Registry,
) -> Result<RewriterConfiguration, ConfigurationError> {
    let mut reader = ConfigurationReader::new(registry.clone());
    for element in elements {
        reader.read(element)?;
    }
    Ok(reader.finish())
}

struct ConfigurationReader {
    registry: Registry,
    rules: Vec<Action>,
    error_handlers: BTreeMap<u16, ErrorHandler>,
    default_documents: Vec<String>,
    logger: Option<Arc<dyn RewriteLogger>>,
}

impl ConfigurationReader {
    fn new(registry: Registry) -> Self {
        Self {
            registry,
            rules: Vec::new(),
            error_handlers: BTreeMap::new(),
            default_documents: Vec::new(),
            logger: None,
        }
    }

    fn read(&mut self, element: &ConfigElement) -> Result<(), ConfigurationError> {
        match element.name.as_str() {
            "error-handler" => self.read_error_handler(element),
            "default-documents" => {
                self.read_default_documents(element);
                Ok(())
            }
            "register" => self.read_register(element),
            "mapping" => self.read_mapping(element),
            _ => {
                let action = parse_action(element, &self.registry)?;
                tracing::debug!(
                    element = %element.name,
                    kind = action.kind(),
                    index = self.rules.len(),
                    "Rule loaded"
                );
                self.rules.push(action);
                Ok(())
            }
        }
    }

    fn read_error_handler(&mut self, element: &ConfigElement) -> Result<(), ConfigurationError> {
        let code = parse_status(&element.name, element.required_attribute("code")?)?.as_u16();

        let handler = match element.exactly_one_of(&["type", "url"])? {
            "type" => {
                let component = self.resolve(element, "type", Capability::ErrorHandler)?;
                match component.error_handler {
                    Some(handler) => ErrorHandler::Custom(handler),
                    None => return Err(mismatch(element, "type", Capability::ErrorHandler)),
                }
            }
            _ => ErrorHandler::RedirectToUrl(element.required_non_empty("url")?.to_string()),
        };

        if self.error_handlers.insert(code, handler).is_some() {
            tracing::debug!(code, "Error handler redefined, later declaration wins");
        }
        Ok(())
    }

    fn read_default_documents(&mut self, element: &ConfigElement) {
        let documents = element
            .children
            .iter()
            .filter(|child| child.name == "document")
            .filter_map(|child| child.text.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        self.default_documents.extend(documents);
    }

    fn read_register(&mut self, element: &ConfigElement) -> Result<(), ConfigurationError> {
        let kind = element.exactly_one_of(&["parser", "transform", "logger"])?;
        element.ensure_no_children()?;

        match kind {
            "parser" => {
                let identifier = element.required_non_empty("parser")?;
                let component = self
                    .registry
                    .activate(identifier)
                    .map_err(|source| registry_error(element, source))?;
                if component.action_parser.is_none() && component.condition_parser.is_none() {
                    return Err(mismatch(element, "parser", Capability::ActionParser));
                }
                if let Some(parser) = component.action_parser {
                    tracing::debug!(
                        identifier,
                        element = parser.name(),
                        "Action parser registered"
                    );
                    self.registry.add_action_parser(parser);
                }
                if let Some(parser) = component.condition_parser {
                    tracing::debug!(identifier, "Condition parser registered");
                    self.registry.add_condition_parser(parser);
                }
            }
            "transform" => {
                let component = self.resolve(element, "transform", Capability::Transform)?;
                let Some(transform) = component.transform else {
                    return Err(mismatch(element, "transform", Capability::Transform));
                };
                tracing::debug!(transform = transform.name(), "Transform registered");
                self.registry.add_transform(Transform::Custom(transform));
            }
            _ => {
                let component = self.resolve(element, "logger", Capability::Logger)?;
                self.logger = component.logger;
            }
        }
        Ok(())
    }

    fn read_mapping(&mut self, element: &ConfigElement) -> Result<(), ConfigurationError> {
        let name = element.required_non_empty("name")?;

        let pairs = element
            .children
            .iter()
            .map(|child| {
                if child.name != "map" {
                    return Err(ConfigurationError::ElementNotAllowed {
                        element: element.name.clone(),
                        child: child.name.clone(),
                    });
                }
                Ok((child.required_attribute("from")?, child.required_attribute("to")?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mapping = StaticMapping::from_pairs(name, pairs);
        tracing::debug!(mapping = name, entries = mapping.len(), "Mapping registered");
        if self.registry.add_transform(mapping.into()).is_some() {
            tracing::debug!(mapping = name, "Transform redefined, later declaration wins");
        }
        Ok(())
    }

    fn resolve(
        &self,
        element: &ConfigElement,
        attribute: &str,
        capability: Capability,
    ) -> Result<Component, ConfigurationError> {
        let identifier = element.required_non_empty(attribute)?;
        self.registry
            .resolve(identifier, capability)
            .map_err(|source| registry_error(element, source))
    }

    fn finish(self) -> RewriterConfiguration {
        RewriterConfiguration::new(
            self.rules,
            self.registry.into_transforms(),
            self.error_handlers,
            self.default_documents,
            self.logger.unwrap_or_else(|| Arc::new(TracingLogger)),
        )
    }
}

fn registry_error(element: &ConfigElement, source: RegistryError) -> ConfigurationError {
    ConfigurationError::Registry {
        element: element.name.clone(),
        source,
    }
}

fn mismatch(
    element: &ConfigElement,
    attribute: &str,
    capability: Capability,
) -> ConfigurationError {
    registry_error(
        element,
        RegistryError::CapabilityMismatch {
            identifier: element.attribute(attribute).unwrap_or_default().to_string(),
            capability,
        },
    )
}
