//! Request inspection and identification.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Extract routing-relevant information (host, scheme, path)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Forwarded scheme only trusted when configured
//! - Unreadable headers are treated as absent

use axum::http::{header, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::{RequestDescriptor, Scheme};
use crate::security::headers::X_FORWARDED_PROTO;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates `x-request-id` values for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Request ID of a request, or `"unknown"`.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Host the client addressed: `Host` header, then URI authority, then empty.
pub fn request_host<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.as_str().to_string()))
        .unwrap_or_default()
}

/// Scheme the client used to reach the site.
///
/// The first `X-Forwarded-Proto` value wins when `trust_forwarded` is set;
/// otherwise the URI scheme, otherwise the listener's own scheme.
pub fn request_scheme<B>(request: &Request<B>, listener: Scheme, trust_forwarded: bool) -> Scheme {
    let forwarded = trust_forwarded
        .then(|| request.headers().get(X_FORWARDED_PROTO))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(Scheme::parse);

    forwarded
        .or_else(|| request.uri().scheme_str().and_then(Scheme::parse))
        .unwrap_or(listener)
}

/// Build the normalizer's view of a request.
pub fn describe<B>(request: &Request<B>, listener: Scheme, trust_forwarded: bool) -> RequestDescriptor {
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    RequestDescriptor::new(
        request_host(request),
        request_scheme(request, listener, trust_forwarded),
        path_and_query,
    )
}
