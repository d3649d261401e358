//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use imagetovideo_gateway::config::GatewayConfig;

/// Spawn `app` on an ephemeral local port.
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// A page renderer that describes the request it received as JSON.
pub async fn start_mock_renderer() -> SocketAddr {
    let app = Router::new().fallback(|method: Method, uri: Uri, headers: HeaderMap| async move {
        Json(json!({
            "method": method.as_str(),
            "target": uri.to_string(),
            "host": header_str(&headers, "host"),
            "locale": header_str(&headers, "x-site-locale"),
            "forwarded_proto": header_str(&headers, "x-forwarded-proto"),
            "forwarded_host": header_str(&headers, "x-forwarded-host"),
            "request_id": header_str(&headers, "x-request-id"),
        }))
    });
    spawn(app).await
}

/// A generation API stand-in.
///
/// - `/v1/slow` sleeps for five seconds
/// - `/v1/media.png` returns binary content
/// - everything else echoes the request as JSON and tries to set a cookie
pub async fn start_mock_generation_api() -> SocketAddr {
    let app = Router::new()
        .route(
            "/v1/slow",
            any(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        )
        .route(
            "/v1/media.png",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "image/png")],
                    Bytes::from_static(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]),
                )
            }),
        )
        .fallback(|method: Method, uri: Uri, headers: HeaderMap, body: Bytes| async move {
            let echo = json!({
                "method": method.as_str(),
                "path": uri.path(),
                "query": uri.query(),
                "authorization": header_str(&headers, "authorization"),
                "cookie": header_str(&headers, "cookie"),
                "content_type": header_str(&headers, "content-type"),
                "body": String::from_utf8_lossy(&body),
            });
            let mut response: Response = (StatusCode::ACCEPTED, Json(echo)).into_response();
            response
                .headers_mut()
                .insert(header::SET_COOKIE, "session=upstream".parse().unwrap());
            response
        });
    spawn(app).await
}

/// A config pointing at local upstreams, with the generation key set in-file.
pub fn test_config(renderer: SocketAddr, generation: Option<SocketAddr>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.pages.upstream = renderer.to_string();
    config.generation.api_key_env = "IMAGETOVIDEO_GATEWAY_TEST_KEY_UNSET".into();
    if let Some(addr) = generation {
        config.generation.base_url = format!("http://{}/v1", addr);
        config.generation.api_key = "test-key".into();
    }
    config
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
