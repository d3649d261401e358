//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LocalePrefix, LogFormat};

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.site.canonical_host, "imagetovideo-ai.net");
        assert_eq!(config.locales.default, "en");
        assert_eq!(config.locales.prefix, LocalePrefix::AsNeeded);
        assert!(config.listener.tls.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config(
            r#"
            [site]
            canonical_host = "example.org"

            [locales]
            supported = ["en", "zh", "ja"]
            prefix = "always"
            detection = true

            [observability]
            log_format = "json"

            [listener.tls]
            cert_path = "/etc/tls/cert.pem"
            key_path = "/etc/tls/key.pem"
            "#,
        )
        .unwrap();

        assert_eq!(config.site.canonical_host, "example.org");
        assert!(config.site.trust_forwarded_proto);
        assert_eq!(config.locales.supported.len(), 3);
        assert_eq!(config.locales.prefix, LocalePrefix::Always);
        assert!(config.locales.detection);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.listener.tls.unwrap().cert_path, "/etc/tls/cert.pem");
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_config("[site\ncanonical_host = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_semantic_error() {
        let err = parse_config("[locales]\ndefault = \"de\"\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors[0].field, "locales.default"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/gateway.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}
