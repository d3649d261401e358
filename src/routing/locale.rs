//! Locale-aware routing for normalized page requests.
//!
//! # Responsibilities
//! - Recognize a locale prefix in the first path segment
//! - Redirect public URLs to their canonical locale form
//! - Rewrite unprefixed paths onto the default locale for the renderer
//! - Optional `Accept-Language` detection
//!
//! # Design Decisions
//! - Locale redirects are 307: the preferred locale can change per visitor
//! - Rewrites are internal; the client URL is left alone
//! - Locale segments match exactly, `Accept-Language` tags case-insensitively

use std::cmp::Ordering;

use axum::http::StatusCode;

use crate::config::{LocaleConfig, LocalePrefix};

/// Locale resolved for a request, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

/// What to do with a delegated page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleRoute {
    /// Send the client to a different public URL served under `locale`.
    Redirect {
        locale: String,
        location: String,
        status: StatusCode,
    },
    /// Serve `path_and_query` from the renderer under `locale`.
    Rewrite { locale: String, path_and_query: String },
}

impl LocaleRoute {
    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            LocaleRoute::Redirect { .. } => "redirect",
            LocaleRoute::Rewrite { .. } => "rewrite",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocaleRouter {
    supported: Vec<String>,
    default: String,
    prefix: LocalePrefix,
    detection: bool,
}

impl LocaleRouter {
    pub fn from_config(config: &LocaleConfig) -> Self {
        Self {
            supported: config.supported.clone(),
            default: config.default.clone(),
            prefix: config.prefix,
            detection: config.detection,
        }
    }

    /// Route one normalized request target.
    pub fn route(&self, path_and_query: &str, accept_language: Option<&str>) -> LocaleRoute {
        let (path, query) = match path_and_query.find('?') {
            Some(idx) => path_and_query.split_at(idx),
            None => (path_and_query, ""),
        };

        match (self.prefix, self.split_locale(path)) {
            (LocalePrefix::AsNeeded, Some((locale, rest))) if locale == self.default => {
                // A leading run of slashes or backslashes would read as a network-path reference.
                let rest = rest.trim_start_matches(['/', '\\']);
                redirect(locale, format!("/{}{}", rest, query))
            }
            (_, Some((locale, _))) => LocaleRoute::Rewrite {
                locale: locale.to_string(),
                path_and_query: path_and_query.to_string(),
            },
            (LocalePrefix::AsNeeded, None) => match self.detect(accept_language) {
                Some(locale) if locale != self.default => {
                    redirect(locale, format!("{}{}", with_prefix(locale, path), query))
                }
                _ => LocaleRoute::Rewrite {
                    locale: self.default.clone(),
                    path_and_query: format!("{}{}", with_prefix(&self.default, path), query),
                },
            },
            (LocalePrefix::Always, None) => {
                let locale = self.detect(accept_language).unwrap_or(self.default.as_str());
                redirect(locale, format!("{}{}", with_prefix(locale, path), query))
            }
        }
    }

    /// Split `/zh/posts/abc` into `("zh", "/posts/abc")` if `zh` is supported.
    fn split_locale<'p>(&self, path: &'p str) -> Option<(&'p str, &'p str)> {
        let trimmed = path.strip_prefix('/')?;
        let (segment, rest) = match trimmed.find('/') {
            Some(idx) => trimmed.split_at(idx),
            None => (trimmed, ""),
        };
        self.supported
            .iter()
            .any(|l| l == segment)
            .then_some((segment, rest))
    }

    /// Pick the best supported locale from an `Accept-Language` header.
    pub fn detect(&self, accept_language: Option<&str>) -> Option<&str> {
        if !self.detection {
            return None;
        }
        let ranges = parse_accept_language(accept_language?);
        ranges.iter().find_map(|(tag, _)| self.match_tag(tag))
    }

    fn match_tag(&self, tag: &str) -> Option<&str> {
        let primary = tag.split('-').next().unwrap_or(tag);
        self.supported
            .iter()
            .find(|l| l.eq_ignore_ascii_case(tag))
            .or_else(|| self.supported.iter().find(|l| l.eq_ignore_ascii_case(primary)))
            .map(String::as_str)
    }
}

fn redirect(locale: &str, location: String) -> LocaleRoute {
    LocaleRoute::Redirect {
        locale: locale.to_string(),
        location,
        status: StatusCode::TEMPORARY_REDIRECT,
    }
}

fn with_prefix(locale: &str, path: &str) -> String {
    if path == "/" || path.is_empty() {
        format!("/{}", locale)
    } else {
        format!("/{}{}", locale, path)
    }
}

/// Parse an `Accept-Language` header into tags ordered by preference.
///
/// Entries with `q=0`, the `*` wildcard, and malformed weights are dropped.
/// Equal weights keep header order.
pub fn parse_accept_language(header: &str) -> Vec<(String, f32)> {
    let mut ranges: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let mut weight = 1.0;
            for param in parts {
                if let Some(q) = param.trim().strip_prefix("q=") {
                    weight = q.trim().parse::<f32>().ok()?;
                }
            }
            (weight > 0.0).then(|| (tag.to_string(), weight))
        })
        .collect();
    ranges.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(prefix: LocalePrefix, detection: bool) -> LocaleRouter {
        LocaleRouter::from_config(&LocaleConfig {
            supported: vec!["en".into(), "zh".into(), "ja".into()],
            prefix,
            detection,
            ..LocaleConfig::default()
        })
    }

    fn rewrite(locale: &str, path_and_query: &str) -> LocaleRoute {
        LocaleRoute::Rewrite {
            locale: locale.into(),
            path_and_query: path_and_query.into(),
        }
    }

    #[test]
    fn test_as_needed_default_prefix_is_stripped() {
        let r = router(LocalePrefix::AsNeeded, false);
        assert_eq!(r.route("/en/pricing?plan=pro", None), redirect("en", "/pricing?plan=pro".into()));
        assert_eq!(r.route("/en", None), redirect("en", "/".into()));
        assert_eq!(r.route("/en?ref=x", None), redirect("en", "/?ref=x".into()));
    }

    #[test]
    fn test_stripped_prefix_never_yields_network_path() {
        let r = LocaleRouter::from_config(&LocaleConfig::default());
        assert_eq!(
            r.route("/en//evil%2Ecom/login", None),
            redirect("en", "/evil%2Ecom/login".into())
        );
        assert_eq!(r.route("/en/\\\\evil.com", None), redirect("en", "/evil.com".into()));
        assert_eq!(r.route("/en///?x=1", None), redirect("en", "/?x=1".into()));

        for path in ["/en//evil.com", "/en/\\/evil.com", "/en////a//b"] {
            match r.route(path, None) {
                LocaleRoute::Redirect { location, .. } => {
                    assert!(location.starts_with('/'), "{path}");
                    assert!(!location.starts_with("//"), "{path}");
                    assert!(!location.starts_with("/\\"), "{path}");
                }
                other => panic!("{path}: expected redirect, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_as_needed_other_locale_passes_through() {
        let r = router(LocalePrefix::AsNeeded, false);
        assert_eq!(r.route("/zh/posts/abc", None), rewrite("zh", "/zh/posts/abc"));
        assert_eq!(r.route("/ja", None), rewrite("ja", "/ja"));
    }

    #[test]
    fn test_as_needed_unprefixed_rewrites_to_default() {
        let r = router(LocalePrefix::AsNeeded, false);
        assert_eq!(r.route("/", None), rewrite("en", "/en"));
        assert_eq!(r.route("/text-to-video?x=1", None), rewrite("en", "/en/text-to-video?x=1"));
        // Unsupported first segments are ordinary paths.
        assert_eq!(r.route("/english/guide", None), rewrite("en", "/en/english/guide"));
        assert_eq!(r.route("/ZH/posts", None), rewrite("en", "/en/ZH/posts"));
    }

    #[test]
    fn test_detection_is_off_by_default() {
        let r = router(LocalePrefix::AsNeeded, false);
        assert_eq!(r.route("/pricing", Some("zh-CN,zh;q=0.9")), rewrite("en", "/en/pricing"));
    }

    #[test]
    fn test_as_needed_detection_redirects_to_preferred_locale() {
        let r = router(LocalePrefix::AsNeeded, true);
        assert_eq!(r.route("/pricing", Some("zh-CN,zh;q=0.9,en;q=0.8")), redirect("zh", "/zh/pricing".into()));
        assert_eq!(r.route("/", Some("ja")), redirect("ja", "/ja".into()));
        assert_eq!(r.route("/", Some("en-US,en;q=0.9")), rewrite("en", "/en"));
        assert_eq!(r.route("/", Some("fr-FR")), rewrite("en", "/en"));
        // An explicit prefix always wins over the header.
        assert_eq!(r.route("/ja/blog", Some("zh")), rewrite("ja", "/ja/blog"));
    }

    #[test]
    fn test_always_prefix() {
        let r = router(LocalePrefix::Always, false);
        assert_eq!(r.route("/pricing?a=1", None), redirect("en", "/en/pricing?a=1".into()));
        assert_eq!(r.route("/", None), redirect("en", "/en".into()));
        assert_eq!(r.route("/en/pricing", None), rewrite("en", "/en/pricing"));
        assert_eq!(r.route("/zh", None), rewrite("zh", "/zh"));

        let r = router(LocalePrefix::Always, true);
        assert_eq!(r.route("/pricing", Some("ja-JP")), redirect("ja", "/ja/pricing".into()));
    }

    #[test]
    fn test_parse_accept_language() {
        let ranges = parse_accept_language("en;q=0.5, zh-CN, ja;q=0.8, *;q=0.1, de;q=0");
        let tags: Vec<_> = ranges.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tags, ["zh-CN", "ja", "en"]);

        assert!(parse_accept_language("").is_empty());
        assert!(parse_accept_language("en;q=abc").is_empty());
    }

    #[test]
    fn test_equal_weights_keep_header_order() {
        let ranges = parse_accept_language("ja, zh, en");
        let tags: Vec<_> = ranges.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tags, ["ja", "zh", "en"]);
    }
}
