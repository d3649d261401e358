//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream request:
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-*)
//!
//! Client response:
//!     → headers.rs (security headers: nosniff, frame options, referrer, HSTS)
//! ```
//!
//! Body size limits are enforced by `tower_http::limit` in the server stack.

pub mod headers;
