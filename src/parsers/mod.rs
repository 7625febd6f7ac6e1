//! Element parsers.
//!
//! # Data Flow
//! ```text
//! ConfigElement (rule or nested action)
//!     → Registry::action_parsers(tag)      candidates in registration order
//!     → acceptance flags checked           children / attributes allowed?
//!     → ActionParser::parse                Ok(None) = "not mine", try next
//!     → Action
//!
//! Condition attributes on if/unless/redirect/rewrite
//!     → every ConditionParser in order     each may contribute one Condition
//!     → ConditionSet
//! ```

pub mod actions;
pub mod conditions;

use std::fmt;
use std::sync::Arc;

use crate::actions::Action;
use crate::conditions::{Condition, ConditionSet};
use crate::config::schema::ConfigElement;
use crate::config::validation::{ConfigurationError, ElementExt};
use crate::engine::template::Template;
use crate::registry::Registry;

pub use actions::{
    AddHeaderParser, ConditionalParser, FixedStatusParser, RedirectParser, RewriteParser,
    SetPropertyParser, SetStatusParser,
};
pub use conditions::{
    HeaderConditionParser, MethodConditionParser, PropertyConditionParser, UrlConditionParser,
};

/// Turns a rule element into an action.
pub trait ActionParser: Send + Sync + fmt::Debug {
    /// Element name this parser claims.
    fn name(&self) -> &str;

    fn allows_nested_actions(&self) -> bool;

    fn allows_attributes(&self) -> bool;

    /// `Ok(None)` lets the next candidate for the same element try.
    fn parse(
        &self,
        element: &ConfigElement,
        registry: &Registry,
    ) -> Result<Option<Action>, ConfigurationError>;
}

/// Contributes a condition from an element's attributes, if it recognises them.
pub trait ConditionParser: Send + Sync + fmt::Debug {
    fn parse(&self, element: &ConfigElement) -> Result<Option<Condition>, ConfigurationError>;
}

/// Parse one element through the registered candidates for its tag.
pub fn parse_action(
    element: &ConfigElement,
    registry: &Registry,
) -> Result<Action, ConfigurationError> {
    for parser in registry.action_parsers(&element.name) {
        if !parser.allows_nested_actions() && !element.children.is_empty() {
            return Err(ConfigurationError::ChildrenNotAllowed {
                element: element.name.clone(),
            });
        }
        if !parser.allows_attributes() && !element.attributes.is_empty() {
            return Err(ConfigurationError::AttributesNotAllowed {
                element: element.name.clone(),
            });
        }
        if let Some(action) = parser.parse(element, registry)? {
            return Ok(action);
        }
    }

    Err(ConfigurationError::UnrecognizedElement {
        element: element.name.clone(),
    })
}

/// Collect every condition the registered condition parsers find on `element`.
pub fn parse_conditions(
    element: &ConfigElement,
    registry: &Registry,
    negate: bool,
) -> Result<ConditionSet, ConfigurationError> {
    let mut set = ConditionSet::new(negate);
    for parser in registry.condition_parsers() {
        if let Some(condition) = parser.parse(element)? {
            set.push(condition);
        }
    }
    Ok(set)
}

/// Compile a required template attribute against the registry's transforms.
pub fn template_attribute(
    element: &ConfigElement,
    attribute: &str,
    registry: &Registry,
) -> Result<Template, ConfigurationError> {
    let source = element.required_attribute(attribute)?;
    Template::compile(source, registry.transforms()).map_err(|e| {
        ConfigurationError::InvalidTemplate {
            element: element.name.clone(),
            template: source.to_string(),
            reason: e.to_string(),
        }
    })
}

pub fn builtin_action_parsers() -> Vec<Arc<dyn ActionParser>> {
    vec![
        Arc::new(ConditionalParser::new("if", false)),
        Arc::new(ConditionalParser::new("unless", true)),
        Arc::new(RedirectParser),
        Arc::new(RewriteParser),
        Arc::new(SetPropertyParser),
        Arc::new(SetStatusParser),
        Arc::new(AddHeaderParser),
        Arc::new(FixedStatusParser::not_found()),
        Arc::new(FixedStatusParser::forbidden()),
        Arc::new(FixedStatusParser::gone()),
        Arc::new(FixedStatusParser::not_allowed()),
        Arc::new(FixedStatusParser::not_implemented()),
    ]
}

pub fn builtin_condition_parsers() -> Vec<Arc<dyn ConditionParser>> {
    vec![
        Arc::new(UrlConditionParser),
        Arc::new(MethodConditionParser),
        Arc::new(PropertyConditionParser),
        Arc::new(HeaderConditionParser),
    ]
}
