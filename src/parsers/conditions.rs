//! Built-in condition parsers.
//!
//! Each parser looks for its own attribute and ignores elements without it.

use crate::conditions::{Condition, MatchSubject, PatternMatch};
use crate::config::schema::ConfigElement;
use crate::config::validation::{ConfigurationError, ElementExt};
use crate::parsers::ConditionParser;

fn compile(
    element: &ConfigElement,
    subject: MatchSubject,
    pattern: &str,
) -> Result<Condition, ConfigurationError> {
    PatternMatch::new(subject, pattern)
        .map(Condition::Pattern)
        .map_err(|source| ConfigurationError::InvalidPattern {
            element: element.name.clone(),
            pattern: pattern.to_string(),
            source,
        })
}

/// `url="<regex>"`
#[derive(Debug, Clone, Copy)]
pub struct UrlConditionParser;

impl ConditionParser for UrlConditionParser {
    fn parse(&self, element: &ConfigElement) -> Result<Option<Condition>, ConfigurationError> {
        element
            .attribute("url")
            .map(|pattern| compile(element, MatchSubject::Url, pattern))
            .transpose()
    }
}

/// `method="GET,HEAD"`
#[derive(Debug, Clone, Copy)]
pub struct MethodConditionParser;

impl ConditionParser for MethodConditionParser {
    fn parse(&self, element: &ConfigElement) -> Result<Option<Condition>, ConfigurationError> {
        let Some(methods) = element.attribute("method") else {
            return Ok(None);
        };
        PatternMatch::method(methods)
            .map(|pattern| Some(Condition::Pattern(pattern)))
            .map_err(|source| ConfigurationError::InvalidPattern {
                element: element.name.clone(),
                pattern: methods.to_string(),
                source,
            })
    }
}

/// `property="<name>" match="<regex>"`
#[derive(Debug, Clone, Copy)]
pub struct PropertyConditionParser;

impl ConditionParser for PropertyConditionParser {
    fn parse(&self, element: &ConfigElement) -> Result<Option<Condition>, ConfigurationError> {
        let Some(name) = element.attribute("property") else {
            return Ok(None);
        };
        let pattern = element.required_attribute("match")?;
        compile(element, MatchSubject::Property(name.to_string()), pattern).map(Some)
    }
}

/// `header="<name>" match="<regex>"`
#[derive(Debug, Clone, Copy)]
pub struct HeaderConditionParser;

impl ConditionParser for HeaderConditionParser {
    fn parse(&self, element: &ConfigElement) -> Result<Option<Condition>, ConfigurationError> {
        let Some(name) = element.attribute("header") else {
            return Ok(None);
        };
        let pattern = element.required_attribute("match")?;
        compile(element, MatchSubject::Header(name.to_string()), pattern).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::RewriteContext;
    use axum::http::{HeaderMap, HeaderValue, Method};

    #[test]
    fn test_url_condition() {
        let element = ConfigElement::new("if").attr("url", "^/OLD/");
        let condition = UrlConditionParser.parse(&element).unwrap().unwrap();
        let mut ctx = RewriteContext::new(Method::GET, "/old/x");
        assert!(condition.is_match(&mut ctx));

        assert!(UrlConditionParser
            .parse(&ConfigElement::new("if"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_invalid_pattern() {
        let element = ConfigElement::new("if").attr("url", "^/(unclosed");
        let err = UrlConditionParser.parse(&element).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
        assert_eq!(err.element(), "if");
    }

    #[test]
    fn test_property_requires_match() {
        let element = ConfigElement::new("if").attr("property", "area");
        assert!(matches!(
            PropertyConditionParser.parse(&element),
            Err(ConfigurationError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_property_condition_absent_key() {
        let element = ConfigElement::new("if")
            .attr("property", "area")
            .attr("match", ".*");
        let condition = PropertyConditionParser.parse(&element).unwrap().unwrap();

        let mut without = RewriteContext::new(Method::GET, "/");
        assert!(!condition.is_match(&mut without));

        let mut with = RewriteContext::new(Method::GET, "/").with_property("area", "");
        assert!(condition.is_match(&mut with));
    }

    #[test]
    fn test_header_condition() {
        let element = ConfigElement::new("if")
            .attr("header", "User-Agent")
            .attr("match", "bot");
        let condition = HeaderConditionParser.parse(&element).unwrap().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("user-agent", HeaderValue::from_static("SearchBot/2.1"));
        let mut ctx = RewriteContext::new(Method::GET, "/").with_headers(headers);
        assert!(condition.is_match(&mut ctx));
    }
}
