//! Built-in action parsers.

use axum::http::{HeaderName, HeaderValue, StatusCode};

use crate::actions::{Action, AddHeader, Conditional, Redirect, Rewrite, SetProperty, SetStatus};
use crate::config::schema::ConfigElement;
use crate::config::validation::{ConfigurationError, ElementExt};
use crate::parsers::{parse_action, parse_conditions, template_attribute, ActionParser};
use crate::registry::Registry;

/// `<if>` / `<unless>`: condition attributes plus nested actions.
#[derive(Debug, Clone)]
pub struct ConditionalParser {
    name: &'static str,
    negate: bool,
}

impl ConditionalParser {
    pub fn new(name: &'static str, negate: bool) -> Self {
        Self { name, negate }
    }
}

impl ActionParser for ConditionalParser {
    fn name(&self) -> &str {
        self.name
    }

    fn allows_nested_actions(&self) -> bool {
        true
    }

    fn allows_attributes(&self) -> bool {
        true
    }

    fn parse(
        &self,
        element: &ConfigElement,
        registry: &Registry,
    ) -> Result<Option<Action>, ConfigurationError> {
        let conditions = parse_conditions(element, registry, self.negate)?;
        let actions = element
            .children
            .iter()
            .map(|child| parse_action(child, registry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Conditional::new(conditions, actions).into()))
    }
}

/// `<redirect to="..." permanent="true|false">` with optional condition attributes.
#[derive(Debug, Clone, Copy)]
pub struct RedirectParser;

impl ActionParser for RedirectParser {
    fn name(&self) -> &str {
        "redirect"
    }

    fn allows_nested_actions(&self) -> bool {
        false
    }

    fn allows_attributes(&self) -> bool {
        true
    }

    fn parse(
        &self,
        element: &ConfigElement,
        registry: &Registry,
    ) -> Result<Option<Action>, ConfigurationError> {
        let target = template_attribute(element, "to", registry)?;
        let permanent = element.boolean_attribute("permanent")?.unwrap_or(true);
        let conditions = parse_conditions(element, registry, false)?;

        Ok(Some(Redirect::new(target, permanent).with_conditions(conditions).into()))
    }
}

/// `<rewrite to="..." processing="continue|stop">` with optional condition attributes.
#[derive(Debug, Clone, Copy)]
pub struct RewriteParser;

impl ActionParser for RewriteParser {
    fn name(&self) -> &str {
        "rewrite"
    }

    fn allows_nested_actions(&self) -> bool {
        false
    }

    fn allows_attributes(&self) -> bool {
        true
    }

    fn parse(
        &self,
        element: &ConfigElement,
        registry: &Registry,
    ) -> Result<Option<Action>, ConfigurationError> {
        let target = template_attribute(element, "to", registry)?;
        let stop = match element.attribute("processing") {
            None | Some("continue") => false,
            Some("stop") => true,
            Some(other) => {
                return Err(ConfigurationError::InvalidAttribute {
                    element: element.name.clone(),
                    attribute: "processing".to_string(),
                    value: other.to_string(),
                    reason: "expected 'continue' or 'stop'".to_string(),
                })
            }
        };
        let conditions = parse_conditions(element, registry, false)?;

        Ok(Some(Rewrite::new(target, stop).with_conditions(conditions).into()))
    }
}

/// `<set property="..." value="...">`. Declines elements without `property`.
#[derive(Debug, Clone, Copy)]
pub struct SetPropertyParser;

impl ActionParser for SetPropertyParser {
    fn name(&self) -> &str {
        "set"
    }

    fn allows_nested_actions(&self) -> bool {
        false
    }

    fn allows_attributes(&self) -> bool {
        true
    }

    fn parse(
        &self,
        element: &ConfigElement,
        registry: &Registry,
    ) -> Result<Option<Action>, ConfigurationError> {
        let Some(key) = element.attribute("property") else {
            return Ok(None);
        };
        if key.is_empty() {
            return Err(ConfigurationError::MissingAttribute {
                element: element.name.clone(),
                attribute: "property".to_string(),
            });
        }
        let value = template_attribute(element, "value", registry)?;

        Ok(Some(SetProperty::new(key, value).into()))
    }
}

/// `<set status="...">`. Declines elements without `status`.
#[derive(Debug, Clone, Copy)]
pub struct SetStatusParser;

impl ActionParser for SetStatusParser {
    fn name(&self) -> &str {
        "set"
    }

    fn allows_nested_actions(&self) -> bool {
        false
    }

    fn allows_attributes(&self) -> bool {
        true
    }

    fn parse(
        &self,
        element: &ConfigElement,
        _registry: &Registry,
    ) -> Result<Option<Action>, ConfigurationError> {
        Ok(element
            .status_attribute("status")?
            .map(|status| SetStatus::new(status).into()))
    }
}

/// `<add header="..." value="...">`. Declines elements without `header`.
#[derive(Debug, Clone, Copy)]
pub struct AddHeaderParser;

impl ActionParser for AddHeaderParser {
    fn name(&self) -> &str {
        "add"
    }

    fn allows_nested_actions(&self) -> bool {
        false
    }

    fn allows_attributes(&self) -> bool {
        true
    }

    fn parse(
        &self,
        element: &ConfigElement,
        _registry: &Registry,
    ) -> Result<Option<Action>, ConfigurationError> {
        if !element.has_attribute("header") {
            return Ok(None);
        }
        let name = element.required_non_empty("header")?;
        let value = element.required_attribute("value")?;
        if let Err(e) = HeaderName::from_bytes(name.as_bytes()) {
            return Err(invalid_header(element, "header", name, e));
        }
        if let Err(e) = HeaderValue::from_str(value) {
            return Err(invalid_header(element, "value", value, e));
        }

        Ok(Some(AddHeader::new(name, value).into()))
    }
}

fn invalid_header(
    element: &ConfigElement,
    attribute: &str,
    value: &str,
    error: impl std::fmt::Display,
) -> ConfigurationError {
    ConfigurationError::InvalidAttribute {
        element: element.name.clone(),
        attribute: attribute.to_string(),
        value: value.to_string(),
        reason: error.to_string(),
    }
}

/// Bare status elements such as `<not-found/>`.
#[derive(Debug, Clone, Copy)]
pub struct FixedStatusParser {
    name: &'static str,
    status: StatusCode,
}

impl FixedStatusParser {
    pub fn new(name: &'static str, status: StatusCode) -> Self {
        Self { name, status }
    }

    pub fn not_found() -> Self {
        Self::new("not-found", StatusCode::NOT_FOUND)
    }

    pub fn forbidden() -> Self {
        Self::new("forbidden", StatusCode::FORBIDDEN)
    }

    pub fn gone() -> Self {
        Self::new("gone", StatusCode::GONE)
    }

    pub fn not_allowed() -> Self {
        Self::new("not-allowed", StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn not_implemented() -> Self {
        Self::new("not-implemented", StatusCode::NOT_IMPLEMENTED)
    }
}

impl ActionParser for FixedStatusParser {
    fn name(&self) -> &str {
        self.name
    }

    fn allows_nested_actions(&self) -> bool {
        false
    }

    fn allows_attributes(&self) -> bool {
        false
    }

    fn parse(
        &self,
        _element: &ConfigElement,
        _registry: &Registry,
    ) -> Result<Option<Action>, ConfigurationError> {
        Ok(Some(SetStatus::new(self.status).into()))
    }
}
