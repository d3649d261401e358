//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID, host/scheme extraction)
//!     → middleware/normalize.rs (canonical host, HTTPS, locale routing)
//!     → pages.rs (renderer pass-through)
//!       or generation.rs (generation API pass-through)
//!       or health.rs
//!     → response.rs (redirects, JSON errors)
//!     → Send to client
//! ```

pub mod generation;
pub mod health;
pub mod middleware;
pub mod pages;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, GatewayServer, ServerError};
