//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the site gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Canonical host and normalization scope.
    pub site: SiteConfig,

    /// Locale routing.
    pub locales: LocaleConfig,

    /// Page renderer upstream.
    pub pages: PagesConfig,

    /// Third-party generation API pass-through.
    pub generation: GenerationConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security hardening.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Canonical host and the set of paths normalization applies to.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// The single authoritative hostname, without `www.` or port.
    pub canonical_host: String,

    /// Honour `X-Forwarded-Proto` from the fronting load balancer.
    pub trust_forwarded_proto: bool,

    /// Path prefixes that bypass normalization and locale routing.
    pub excluded_prefixes: Vec<String>,

    /// Skip paths that look like files (contain a `.`).
    pub skip_file_paths: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            canonical_host: "imagetovideo-ai.net".to_string(),
            trust_forwarded_proto: true,
            excluded_prefixes: vec![
                "/api".to_string(),
                "/_next".to_string(),
                "/_vercel".to_string(),
            ],
            skip_file_paths: true,
        }
    }
}

/// How locale prefixes appear in public URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocalePrefix {
    /// The default locale is served without a prefix.
    AsNeeded,
    /// Every public URL carries a locale prefix.
    Always,
}

/// Locale routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Supported locale codes, matched against the first path segment.
    pub supported: Vec<String>,

    /// Locale used when none is present in the path.
    pub default: String,

    /// Prefix strategy.
    pub prefix: LocalePrefix,

    /// Redirect unprefixed requests by `Accept-Language`.
    pub detection: bool,

    /// Request header carrying the resolved locale to the renderer.
    pub header: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            supported: vec!["en".to_string(), "zh".to_string()],
            default: "en".to_string(),
            prefix: LocalePrefix::AsNeeded,
            detection: false,
            header: "x-site-locale".to_string(),
        }
    }
}

/// Page renderer upstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PagesConfig {
    /// Renderer address (e.g., "127.0.0.1:3000").
    pub upstream: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            upstream: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Generation API pass-through configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of the generation API. Empty disables the proxy.
    pub base_url: String,

    /// API key from the config file. The environment variable wins.
    pub api_key: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Upstream request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            api_key_env: "IMAGETOVIDEO_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

impl GenerationConfig {
    /// Resolve the API key, preferring the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| Some(self.api_key.clone()).filter(|key| !key.trim().is_empty()))
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 180,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// `Strict-Transport-Security` max-age; 0 disables the header.
    pub hsts_max_age_secs: u64,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            hsts_max_age_secs: 31_536_000,
            max_body_size: 20 * 1024 * 1024, // 20MB, image uploads
        }
    }
}
