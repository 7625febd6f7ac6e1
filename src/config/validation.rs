//! Configuration validation.
//!
//! # Responsibilities
//! - Define the load-time error type (`ConfigurationError`)
//! - Attribute helpers shared by the reader and the parsers: required and
//!   optional attributes, booleans, status codes, "exactly one of"
//!
//! # Design Decisions
//! - Every error names the offending element so operators can locate it
//! - Errors are raised only while loading; evaluation never fails

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::schema::ConfigElement;
use crate::registry::RegistryError;

/// Errors raised while building a rewriter configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("<{element}>: required attribute '{attribute}' is missing")]
    MissingAttribute { element: String, attribute: String },

    #[error("<{element}>: exactly one of {expected} must be specified")]
    AmbiguousAttributes { element: String, expected: String },

    #[error("<{element}>: invalid value '{value}' for attribute '{attribute}': {reason}")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
        reason: String,
    },

    #[error("<{element}>: '{value}' is not a valid HTTP status code")]
    InvalidStatusCode { element: String, value: String },

    #[error("<{element}>: child elements are not allowed")]
    ChildrenNotAllowed { element: String },

    #[error("<{element}>: attributes are not allowed")]
    AttributesNotAllowed { element: String },

    #[error("<{element}>: element <{child}> is not allowed here")]
    ElementNotAllowed { element: String, child: String },

    #[error("<{element}>: element not recognized")]
    UnrecognizedElement { element: String },

    #[error("<{element}>: invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        element: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("<{element}>: invalid template '{template}': {reason}")]
    InvalidTemplate {
        element: String,
        template: String,
        reason: String,
    },

    #[error("<{element}>: {source}")]
    Registry {
        element: String,
        #[source]
        source: RegistryError,
    },
}

impl ConfigurationError {
    /// The element the error was raised for.
    pub fn element(&self) -> &str {
        match self {
            Self::MissingAttribute { element, .. }
            | Self::AmbiguousAttributes { element, .. }
            | Self::InvalidAttribute { element, .. }
            | Self::InvalidStatusCode { element, .. }
            | Self::ChildrenNotAllowed { element }
            | Self::AttributesNotAllowed { element }
            | Self::ElementNotAllowed { element, .. }
            | Self::UnrecognizedElement { element }
            | Self::InvalidPattern { element, .. }
            | Self::InvalidTemplate { element, .. }
            | Self::Registry { element, .. } => element,
        }
    }
}

/// Attribute accessors that report failures as `ConfigurationError`.
pub trait ElementExt {
    fn required_attribute(&self, name: &str) -> Result<&str, ConfigurationError>;

    /// Like `required_attribute`, but an empty value counts as missing.
    fn required_non_empty(&self, name: &str) -> Result<&str, ConfigurationError>;

    fn boolean_attribute(&self, name: &str) -> Result<Option<bool>, ConfigurationError>;

    fn status_attribute(&self, name: &str) -> Result<Option<StatusCode>, ConfigurationError>;

    /// Returns the single present attribute out of `names`.
    fn exactly_one_of<'a>(&self, names: &[&'a str]) -> Result<&'a str, ConfigurationError>;

    fn ensure_no_children(&self) -> Result<(), ConfigurationError>;
}

impl ElementExt for ConfigElement {
    fn required_attribute(&self, name: &str) -> Result<&str, ConfigurationError> {
        self.attribute(name)
            .ok_or_else(|| ConfigurationError::MissingAttribute {
                element: self.name.clone(),
                attribute: name.to_string(),
            })
    }

    fn required_non_empty(&self, name: &str) -> Result<&str, ConfigurationError> {
        match self.required_attribute(name)? {
            "" => Err(ConfigurationError::MissingAttribute {
                element: self.name.clone(),
                attribute: name.to_string(),
            }),
            value => Ok(value),
        }
    }

    fn boolean_attribute(&self, name: &str) -> Result<Option<bool>, ConfigurationError> {
        let Some(value) = self.attribute(name) else {
            return Ok(None);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(ConfigurationError::InvalidAttribute {
                element: self.name.clone(),
                attribute: name.to_string(),
                value: value.to_string(),
                reason: "expected 'true' or 'false'".to_string(),
            }),
        }
    }

    fn status_attribute(&self, name: &str) -> Result<Option<StatusCode>, ConfigurationError> {
        let Some(value) = self.attribute(name) else {
            return Ok(None);
        };
        parse_status(&self.name, value).map(Some)
    }

    fn exactly_one_of<'a>(&self, names: &[&'a str]) -> Result<&'a str, ConfigurationError> {
        let mut present = names.iter().filter(|n| self.has_attribute(n));
        match (present.next(), present.next()) {
            (Some(name), None) => Ok(name),
            _ => Err(ConfigurationError::AmbiguousAttributes {
                element: self.name.clone(),
                expected: names
                    .iter()
                    .map(|n| format!("'{}'", n))
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    fn ensure_no_children(&self) -> Result<(), ConfigurationError> {
        if self.children.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::ChildrenNotAllowed {
                element: self.name.clone(),
            })
        }
    }
}

/// Parse a numeric HTTP status code.
pub fn parse_status(element: &str, value: &str) -> Result<StatusCode, ConfigurationError> {
    value
        .trim()
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| ConfigurationError::InvalidStatusCode {
            element: element.to_string(),
            value: value.to_string(),
        })
}
