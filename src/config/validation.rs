//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the canonical host is a bare hostname
//! - Check the locale set is consistent with its default
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., `site.canonical_host`).
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    validate_canonical_host(&config.site.canonical_host, &mut errors);

    for prefix in &config.site.excluded_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::new(
                "site.excluded_prefixes",
                format!("'{}' must start with '/'", prefix),
            ));
        }
    }

    let locales = &config.locales;
    if locales.supported.is_empty() {
        errors.push(ValidationError::new("locales.supported", "at least one locale is required"));
    }
    let mut seen = HashSet::new();
    for locale in &locales.supported {
        if locale.is_empty() || locale.contains('/') {
            errors.push(ValidationError::new(
                "locales.supported",
                format!("'{}' is not a valid path segment", locale),
            ));
        }
        if !seen.insert(locale.as_str()) {
            errors.push(ValidationError::new(
                "locales.supported",
                format!("'{}' is listed twice", locale),
            ));
        }
    }
    if !locales.supported.contains(&locales.default) {
        errors.push(ValidationError::new(
            "locales.default",
            format!("'{}' is not in locales.supported", locales.default),
        ));
    }
    if axum::http::HeaderName::from_bytes(locales.header.as_bytes()).is_err() {
        errors.push(ValidationError::new(
            "locales.header",
            format!("'{}' is not a valid header name", locales.header),
        ));
    }

    if config.pages.upstream.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "pages.upstream",
            format!("'{}' is not a socket address", config.pages.upstream),
        ));
    }

    if !config.generation.base_url.is_empty() {
        match Url::parse(&config.generation.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {}
            _ => errors.push(ValidationError::new(
                "generation.base_url",
                format!("'{}' is not an absolute http(s) URL", config.generation.base_url),
            )),
        }
    }
    if config.generation.timeout_secs == 0 {
        errors.push(ValidationError::new("generation.timeout_secs", "must be greater than 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_canonical_host(host: &str, errors: &mut Vec<ValidationError>) {
    const FIELD: &str = "site.canonical_host";

    if host.is_empty() {
        errors.push(ValidationError::new(FIELD, "must not be empty"));
        return;
    }
    if host.contains("://") || host.contains('/') {
        errors.push(ValidationError::new(FIELD, "must be a hostname, not a URL"));
    }
    if host.contains(':') {
        errors.push(ValidationError::new(FIELD, "must not carry a port"));
    }
    if host.starts_with("www.") {
        errors.push(ValidationError::new(FIELD, "must not start with 'www.'"));
    }
    if host != host.to_ascii_lowercase() {
        errors.push(ValidationError::new(FIELD, "must be lowercase"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_canonical_host_rules() {
        let mut config = GatewayConfig::default();
        config.site.canonical_host = "https://www.Example.com:443".into();

        let errors = validate_config(&config).unwrap_err();
        let messages: Vec<_> = errors
            .iter()
            .filter(|e| e.field == "site.canonical_host")
            .map(|e| e.message.as_str())
            .collect();

        assert!(messages.contains(&"must be a hostname, not a URL"));
        assert!(messages.contains(&"must not carry a port"));
        assert!(messages.contains(&"must be lowercase"));
    }

    #[test]
    fn test_www_canonical_host_rejected() {
        let mut config = GatewayConfig::default();
        config.site.canonical_host = "www.imagetovideo-ai.net".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "site.canonical_host: must not start with 'www.'");
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.locales.default = "fr".into();
        config.locales.supported.push("zh".into());
        config.generation.base_url = "ftp://files.example.com".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();

        assert!(fields.contains(&"listener.bind_address"));
        assert!(fields.contains(&"locales.default"));
        assert!(fields.contains(&"locales.supported"));
        assert!(fields.contains(&"generation.base_url"));
        assert!(fields.contains(&"timeouts.request_secs"));
    }

    #[test]
    fn test_excluded_prefix_must_be_absolute() {
        let mut config = GatewayConfig::default();
        config.site.excluded_prefixes = vec!["api".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "site.excluded_prefixes");
    }
}
