//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Configure HTTP/1.1 and HTTP/2 support, plain or TLS
//! - Wire up middleware (tracing, request ID, limits, security headers)
//! - Normalize page requests before they reach the renderer
//! - Bind server to listener and drain on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::uri::InvalidUri,
    middleware::from_fn_with_state,
    routing::{any, get},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::generation::{forward_generation, GenerationUpstream};
use crate::http::health::health;
use crate::http::middleware::normalize::{normalize_middleware, SiteRouting};
use crate::http::pages::{forward_page, PagesUpstream};
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::net::tls::load_tls_config;
use crate::routing::Scheme;
use crate::security::headers::with_security_headers;

/// How long in-flight TLS connections get to finish after shutdown.
const TLS_DRAIN_SECS: u64 = 30;

/// Errors building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid page upstream address: {0}")]
    PagesUpstream(#[from] InvalidUri),

    #[error("Failed to build generation API client: {0}")]
    GenerationClient(#[from] reqwest::Error),

    #[error("TLS setup failed: {0}")]
    Tls(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<SiteRouting>,
    pub pages: PagesUpstream,
    pub generation: GenerationUpstream,
}

/// HTTP server for the site gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let listener_scheme = if config.listener.tls.is_some() {
            Scheme::Https
        } else {
            Scheme::Http
        };

        let state = AppState {
            site: Arc::new(SiteRouting::from_config(&config, listener_scheme)),
            pages: PagesUpstream::from_config(&config)?,
            generation: GenerationUpstream::from_config(&config)?,
        };

        if !state.generation.is_enabled() {
            tracing::warn!(
                api_key_env = %config.generation.api_key_env,
                "Generation API base URL or key missing; /api/generation answers 503"
            );
        }

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/api/health", get(health))
            .route("/api/generation/{*path}", any(forward_generation))
            .fallback(forward_page)
            .layer(from_fn_with_state(state.site.clone(), normalize_middleware))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        with_security_headers(router, &config.security)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The fully layered router, for driving requests in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        match &self.config.listener.tls {
            Some(tls) => {
                let rustls = load_tls_config(tls).await.map_err(ServerError::Tls)?;
                let handle = axum_server::Handle::new();
                let drain = handle.clone();
                tokio::spawn(async move {
                    let _ = shutdown.recv().await;
                    drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
                });

                tracing::info!(address = %addr, "HTTPS server starting");
                axum_server::from_tcp_rustls(listener.into_std()?, rustls)
                    .handle(handle)
                    .serve(app)
                    .await?;
            }
            None => {
                tracing::info!(address = %addr, "HTTP server starting");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown.recv().await;
                        tracing::info!("Shutdown signal received");
                    })
                    .await?;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
