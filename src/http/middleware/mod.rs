//! Request middleware.

pub mod normalize;

pub use normalize::{normalize_middleware, SiteRouting};
