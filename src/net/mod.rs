//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → tls.rs (optional TLS handshake, via axum-server + rustls)
//!     → Hand off to HTTP layer
//! ```
//!
//! A TLS listener reports its requests as `https` to the normalizer; a plain
//! listener relies on `X-Forwarded-Proto` from the load balancer.

pub mod tls;
