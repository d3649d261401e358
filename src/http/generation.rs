//! Generation API pass-through.
//!
//! `ANY /api/generation/{*path}` is forwarded to `{base_url}/{path}` with the
//! server-held API key. Bodies stream in both directions, so JSON requests
//! and binary media responses take the same path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, HttpBody},
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request},
    response::Response,
};
use url::Url;

use crate::config::{GatewayConfig, GenerationConfig};
use crate::http::request::{request_id, X_REQUEST_ID};
use crate::http::response::GenerationError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::headers::strip_hop_by_hop;

/// Path prefix routed to the generation API.
pub const GENERATION_PREFIX: &str = "/api/generation/";

/// Client headers that reach the generation API. Everything else is dropped.
const FORWARDED_REQUEST_HEADERS: [HeaderName; 5] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::ACCEPT,
    header::ACCEPT_LANGUAGE,
    X_REQUEST_ID,
];

/// Client for the third-party generation API.
#[derive(Clone)]
pub struct GenerationUpstream {
    client: reqwest::Client,
    base_url: Option<Url>,
    api_key: Option<Arc<str>>,
}

impl GenerationUpstream {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.generation,
            config.generation.resolve_api_key(),
            Duration::from_secs(config.timeouts.connect_secs),
        )
    }

    pub fn new(
        config: &GenerationConfig,
        api_key: Option<String>,
        connect_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let base_url = match Url::parse(&config.base_url) {
            Ok(url) => Some(url),
            Err(_) if config.base_url.is_empty() => None,
            Err(e) => {
                tracing::warn!(base_url = %config.base_url, error = %e, "Ignoring invalid generation base URL");
                None
            }
        };

        Ok(Self {
            client,
            base_url,
            api_key: api_key.map(Arc::from),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.base_url.is_some() && self.api_key.is_some()
    }

    /// Map the part of the path after [`GENERATION_PREFIX`] onto the base URL.
    ///
    /// Segments stay percent-encoded as received. Empty, `.` and `..`
    /// segments are rejected so a request cannot climb out of the base path.
    pub fn target_url(&self, rest: &str, query: Option<&str>) -> Result<Url, GenerationError> {
        let base = self.base_url.as_ref().ok_or(GenerationError::Disabled)?;

        let escapes = rest.split('/').any(|s| {
            let decoded = s.to_ascii_lowercase().replace("%2e", ".");
            s.is_empty() || decoded == "." || decoded == ".."
        });
        if escapes {
            return Err(GenerationError::InvalidTarget(rest.to_string()));
        }

        let mut url = base.clone();
        url.set_path(&format!("{}/{}", base.path().trim_end_matches('/'), rest));
        url.set_query(query);
        Ok(url)
    }
}

/// Forward one request to the generation API.
pub async fn forward_generation(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, GenerationError> {
    let start = Instant::now();
    let upstream = &state.generation;
    let Some(api_key) = upstream.api_key.clone() else {
        return Err(GenerationError::Disabled);
    };

    let rest = request
        .uri()
        .path()
        .strip_prefix(GENERATION_PREFIX)
        .unwrap_or_default();
    let url = upstream.target_url(rest, request.uri().query())?;
    let request_id = request_id(&request);

    let (parts, body) = request.into_parts();
    let method = parts.method;

    let mut headers = HeaderMap::new();
    for name in FORWARDED_REQUEST_HEADERS {
        for value in parts.headers.get_all(&name) {
            headers.append(name.clone(), value.clone());
        }
    }

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %url.path(),
        "Forwarding generation request"
    );

    let mut builder = upstream
        .client
        .request(method.clone(), url)
        .headers(headers)
        .bearer_auth(&*api_key);
    if !body.is_end_stream() {
        builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    let upstream_response = match builder.send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Generation API request failed");
            metrics::record_upstream_error("generation");
            let err = GenerationError::from(e);
            metrics::record_request("generation", method.as_str(), err.status().as_u16(), start);
            return Err(err);
        }
    };

    let status = upstream_response.status();
    let mut headers = upstream_response.headers().clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::SET_COOKIE);
    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    metrics::record_request("generation", method.as_str(), status.as_u16(), start);

    let mut response = Response::new(Body::from_stream(upstream_response.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
