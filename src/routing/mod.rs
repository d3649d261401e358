//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming page request (host, scheme, path)
//!     → matcher.rs (is the path in scope?)
//!     → normalizer.rs (canonical host / HTTPS redirect, or delegate)
//!     → locale.rs (locale redirect, or rewrite onto a locale path)
//!     → page proxy
//! ```
//!
//! # Design Decisions
//! - Built once from config at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always yields the same decision
//! - First match wins

pub mod locale;
pub mod matcher;
pub mod normalizer;

pub use locale::{Locale, LocaleRoute, LocaleRouter};
pub use matcher::PathScope;
pub use normalizer::{Decision, Normalizer, RedirectReason, RequestDescriptor, Scheme};
