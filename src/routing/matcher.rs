//! Path scope matching.
//!
//! # Responsibilities
//! - Decide which request paths go through normalization and locale routing
//! - Skip API routes, framework asset prefixes, and file-like paths
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Prefix matching only, no regex
//! - Empty matcher set = everything in scope

use std::fmt::Debug;

use crate::config::SiteConfig;

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches a literal path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Matches paths that name a file (`/favicon.ico`, `/images/a.png`).
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePathMatcher;

impl Matcher for FilePathMatcher {
    fn matches(&self, path: &str) -> bool {
        path.contains('.')
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug, Default)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

/// The set of paths normalization applies to.
///
/// A path is in scope unless one of the exclusions matches it.
#[derive(Debug, Default)]
pub struct PathScope {
    exclusions: AnyMatcher,
}

impl PathScope {
    pub fn from_config(config: &SiteConfig) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> = config
            .excluded_prefixes
            .iter()
            .map(|prefix| Box::new(PathPrefixMatcher::new(prefix.clone())) as Box<dyn Matcher>)
            .collect();
        if config.skip_file_paths {
            matchers.push(Box::new(FilePathMatcher));
        }
        Self {
            exclusions: AnyMatcher::new(matchers),
        }
    }

    /// Returns true if the path should be normalized and locale-routed.
    pub fn applies(&self, path: &str) -> bool {
        !self.exclusions.matches(path)
    }
}
