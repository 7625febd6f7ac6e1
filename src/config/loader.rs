//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::model::RewriterConfiguration;
use crate::config::reader::read_configuration;
use crate::config::schema::{RulesDocument, ServerConfig};
use crate::config::validation::ConfigurationError;
use crate::registry::Registry;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid rewriter configuration: {0}")]
    Rewriter(#[from] ConfigurationError),
}

/// Load server settings from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load a rules file and build the rewriter configuration from it.
pub fn load_rules(path: &Path, registry: &Registry) -> Result<RewriterConfiguration, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_rules(&content, registry)?;

    tracing::info!(
        path = %path.display(),
        rules = config.rules().len(),
        error_handlers = config.error_handlers().len(),
        "Rewriter configuration loaded"
    );
    Ok(config)
}

/// Build the rewriter configuration from rules document text.
pub fn parse_rules(
    content: &str,
    registry: &Registry,
) -> Result<RewriterConfiguration, ConfigError> {
    let document: RulesDocument = toml::from_str(content)?;
    Ok(read_configuration(&document.elements, registry)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nbind_address = \"127.0.0.1:3000\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(config.timeouts.request_secs, 30);
        assert!(config.rewriter.rules_file.is_none());
    }

    #[test]
    fn test_parse_rules() {
        let content = r#"
            [[element]]
            name = "if"
            attributes = { url = "^/old/(.*)$" }

              [[element.children]]
              name = "redirect"
              attributes = { to = "/new/$1", permanent = true }

            [[element]]
            name = "not-found"
        "#;
        let config = parse_rules(content, &Registry::new()).unwrap();
        assert_eq!(config.rules().len(), 2);
        assert_eq!(config.rules()[0].kind(), "conditional");
    }

    #[test]
    fn test_parse_rules_errors() {
        assert!(matches!(
            parse_rules("[[element]]\nattributes = {}", &Registry::new()),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            parse_rules("[[element]]\nname = \"bogus\"", &Registry::new()),
            Err(ConfigError::Rewriter(ConfigurationError::UnrecognizedElement { .. }))
        ));
    }

    #[test]
    fn test_load_rules_missing_file() {
        let result = load_rules(Path::new("/nonexistent/rules.toml"), &Registry::new());
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
