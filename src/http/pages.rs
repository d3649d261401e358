//! Page renderer pass-through.
//!
//! Every request that reaches the fallback (delegated pages and static
//! assets) is forwarded to the renderer over plain HTTP.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{
        header,
        uri::{Authority, InvalidUri, PathAndQuery, Scheme as UriScheme},
        HeaderValue, Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::GatewayConfig;
use crate::http::request::{request_host, request_id, request_scheme};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::headers::{set_forwarded, strip_hop_by_hop};

/// Connection to the page renderer.
#[derive(Clone)]
pub struct PagesUpstream {
    client: Client<HttpConnector, Body>,
    authority: Authority,
}

impl PagesUpstream {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, InvalidUri> {
        let authority = Authority::from_str(&config.pages.upstream)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self { client, authority })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Rewrite a client URI onto the renderer.
    fn upstream_uri(&self, uri: &Uri) -> Result<Uri, axum::http::Error> {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(UriScheme::HTTP);
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        Ok(Uri::from_parts(parts)?)
    }
}

/// Fallback handler: forward to the renderer and stream the response back.
pub async fn forward_page(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request);
    let host = request_host(&request);
    let scheme = request_scheme(
        &request,
        state.site.listener_scheme,
        state.site.trust_forwarded_proto,
    );
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let (mut parts, body) = request.into_parts();
    let method = parts.method.clone();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %parts.uri.path(),
        "Forwarding page request"
    );

    parts.uri = match state.pages.upstream_uri(&parts.uri) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Cannot build renderer URI");
            return (StatusCode::BAD_REQUEST, "Invalid request target").into_response();
        }
    };
    // The renderer connection is HTTP/1.1 regardless of the client's protocol.
    parts.version = Version::HTTP_11;

    strip_hop_by_hop(&mut parts.headers);
    set_forwarded(&mut parts.headers, client_ip, &host, scheme);
    if !parts.headers.contains_key(header::HOST) {
        if let Ok(value) = HeaderValue::from_str(&host) {
            parts.headers.insert(header::HOST, value);
        }
    }

    match state.pages.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            metrics::record_request("pages", method.as_str(), parts.status.as_u16(), start);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                upstream = %state.pages.authority,
                error = %e,
                "Renderer request failed"
            );
            metrics::record_upstream_error("pages");
            metrics::record_request("pages", method.as_str(), 502, start);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
