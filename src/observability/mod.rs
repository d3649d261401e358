//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! Per-request spans come from `tower_http::trace::TraceLayer`; the
//! `x-request-id` header ties log lines to upstream calls.

pub mod logging;
pub mod metrics;
