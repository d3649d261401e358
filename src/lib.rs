//! imagetovideo-ai.net site gateway.
//!
//! Canonical-host and HTTPS enforcement, locale routing in front of the page
//! renderer, and a pass-through to the image/video generation API.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use routing::{Decision, Normalizer, RequestDescriptor};
