//! Canonical host and protocol normalization.
//!
//! # Responsibilities
//! - Redirect `www.` traffic to the canonical host
//! - Upgrade plain HTTP requests to HTTPS
//! - Hand everything else to the locale router
//!
//! # Design Decisions
//! - Pure function of the request descriptor and the canonical host; no I/O
//! - Rules are an ordered table, first match wins
//! - Host rule runs before the scheme rule, so an insecure `www.` request
//!   lands on the secure canonical URL in a single hop
//! - Every redirect is 308 (permanent, method-preserving)

use std::fmt;

use axum::http::StatusCode;

/// URL scheme of an incoming request, as far as normalization cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// Parse a scheme token (`http`, `HTTPS`, ...). Unknown tokens yield `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("https") {
            Some(Scheme::Https)
        } else if token.eq_ignore_ascii_case("http") {
            Some(Scheme::Http)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, Scheme::Https)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of a request the normalizer looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Host as sent by the client, possibly with a `:port` suffix. Empty if absent.
    pub host: String,
    pub scheme: Scheme,
    /// Path plus optional `?query`; always starts with `/`.
    pub path_and_query: String,
}

impl RequestDescriptor {
    pub fn new(host: impl Into<String>, scheme: Scheme, path_and_query: impl Into<String>) -> Self {
        let mut path_and_query = path_and_query.into();
        if !path_and_query.starts_with('/') {
            path_and_query.insert(0, '/');
        }
        Self {
            host: host.into(),
            scheme,
            path_and_query,
        }
    }

    /// Build a descriptor from an absolute URL such as `http://host/path?q`.
    ///
    /// Returns `None` for anything that is not an absolute http(s) URL.
    pub fn from_url(url: &str) -> Option<Self> {
        let (scheme, rest) = url.split_once("://")?;
        let scheme = Scheme::parse(scheme)?;
        let (host, path_and_query) = match rest.find(['/', '?']) {
            Some(idx) => rest.split_at(idx),
            None => (rest, "/"),
        };
        Some(Self::new(host, scheme, path_and_query))
    }

    /// The host without any `:port` suffix.
    pub fn hostname(&self) -> &str {
        split_host_port(&self.host).0
    }

    /// Reassemble the absolute URL.
    pub fn url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path_and_query)
    }
}

/// Split `host[:port]`, keeping bracketed IPv6 literals intact.
pub fn split_host_port(host: &str) -> (&str, Option<&str>) {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => {
                let (name, rest) = host.split_at(end + 1);
                (name, rest.strip_prefix(':'))
            }
            None => (host, None),
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            (name, Some(port))
        }
        _ => (host, None),
    }
}

/// Which rule produced a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedirectReason {
    /// `www.` host rewritten to the canonical host.
    CanonicalHost,
    /// Plain HTTP upgraded to HTTPS.
    SecureScheme,
}

impl RedirectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectReason::CanonicalHost => "canonical_host",
            RedirectReason::SecureScheme => "secure_scheme",
        }
    }
}

/// Outcome of normalizing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Answer with a redirect to `location`.
    Redirect {
        location: String,
        status: StatusCode,
        reason: RedirectReason,
    },
    /// Continue to locale routing.
    Delegate,
}

impl Decision {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Decision::Redirect { .. })
    }

    /// Metric label for this decision.
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Redirect { reason, .. } => reason.as_str(),
            Decision::Delegate => "delegate",
        }
    }
}

/// One predicate → action pair in the rule table.
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&Normalizer, &RequestDescriptor) -> bool,
    pub action: fn(&Normalizer, &RequestDescriptor) -> Decision,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Rules in evaluation order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "canonical_host",
        applies: is_www_host,
        action: redirect_to_canonical_host,
    },
    Rule {
        name: "secure_scheme",
        applies: is_insecure,
        action: upgrade_scheme,
    },
    Rule {
        name: "delegate",
        applies: always,
        action: delegate,
    },
];

fn is_www_host(normalizer: &Normalizer, req: &RequestDescriptor) -> bool {
    req.hostname() == normalizer.www_host
}

fn redirect_to_canonical_host(normalizer: &Normalizer, req: &RequestDescriptor) -> Decision {
    Decision::Redirect {
        location: format!("https://{}{}", normalizer.canonical_host, req.path_and_query),
        status: StatusCode::PERMANENT_REDIRECT,
        reason: RedirectReason::CanonicalHost,
    }
}

fn is_insecure(_: &Normalizer, req: &RequestDescriptor) -> bool {
    !req.scheme.is_secure()
}

fn upgrade_scheme(normalizer: &Normalizer, req: &RequestDescriptor) -> Decision {
    let host = match split_host_port(&req.host) {
        ("", _) => normalizer.canonical_host.as_str(),
        (name, Some("80")) => name,
        _ => req.host.as_str(),
    };
    Decision::Redirect {
        location: format!("https://{}{}", host, req.path_and_query),
        status: StatusCode::PERMANENT_REDIRECT,
        reason: RedirectReason::SecureScheme,
    }
}

fn always(_: &Normalizer, _: &RequestDescriptor) -> bool {
    true
}

fn delegate(_: &Normalizer, _: &RequestDescriptor) -> Decision {
    Decision::Delegate
}

/// Decides, per request, between a redirect and delegation.
#[derive(Debug, Clone)]
pub struct Normalizer {
    canonical_host: String,
    www_host: String,
}

impl Normalizer {
    pub fn new(canonical_host: impl Into<String>) -> Self {
        let canonical_host = canonical_host.into();
        let www_host = format!("www.{}", canonical_host);
        Self {
            canonical_host,
            www_host,
        }
    }

    pub fn canonical_host(&self) -> &str {
        &self.canonical_host
    }

    /// Evaluate the rule table against one request.
    pub fn decide(&self, req: &RequestDescriptor) -> Decision {
        self.matching_rule(req)
            .map(|rule| (rule.action)(self, req))
            .unwrap_or(Decision::Delegate)
    }

    /// The first rule whose predicate holds.
    pub fn matching_rule(&self, req: &RequestDescriptor) -> Option<&'static Rule> {
        RULES.iter().find(|rule| (rule.applies)(self, req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "imagetovideo-ai.net";

    fn normalizer() -> Normalizer {
        Normalizer::new(CANONICAL)
    }

    fn decide(url: &str) -> Decision {
        normalizer().decide(&RequestDescriptor::from_url(url).unwrap())
    }

    fn redirect(location: &str, reason: RedirectReason) -> Decision {
        Decision::Redirect {
            location: location.to_string(),
            status: StatusCode::PERMANENT_REDIRECT,
            reason,
        }
    }

    #[test]
    fn test_insecure_www_goes_straight_to_canonical() {
        assert_eq!(
            decide("http://www.imagetovideo-ai.net/text-to-video?x=1"),
            redirect("https://imagetovideo-ai.net/text-to-video?x=1", RedirectReason::CanonicalHost)
        );
    }

    #[test]
    fn test_canonical_secure_delegates() {
        assert_eq!(decide("https://imagetovideo-ai.net/"), Decision::Delegate);
        assert_eq!(decide("https://imagetovideo-ai.net/zh/blog?page=2"), Decision::Delegate);
    }

    #[test]
    fn test_insecure_canonical_is_upgraded() {
        assert_eq!(
            decide("http://imagetovideo-ai.net/zh/posts/abc"),
            redirect("https://imagetovideo-ai.net/zh/posts/abc", RedirectReason::SecureScheme)
        );
    }

    #[test]
    fn test_secure_www_redirects() {
        assert_eq!(
            decide("https://www.imagetovideo-ai.net/pricing"),
            redirect("https://imagetovideo-ai.net/pricing", RedirectReason::CanonicalHost)
        );
    }

    #[test]
    fn test_www_with_port_drops_port() {
        assert_eq!(
            decide("https://www.imagetovideo-ai.net:8080/a?b=c"),
            redirect("https://imagetovideo-ai.net/a?b=c", RedirectReason::CanonicalHost)
        );
    }

    #[test]
    fn test_www_match_is_case_sensitive() {
        // Only the exact form is rewritten; other spellings fall through.
        assert_eq!(decide("https://WWW.imagetovideo-ai.net/"), Decision::Delegate);
    }

    #[test]
    fn test_www_of_other_domain_is_not_canonicalized() {
        assert_eq!(decide("https://www.example.com/"), Decision::Delegate);
        assert_eq!(decide("https://www.imagetovideo-ai.net.evil.com/"), Decision::Delegate);
    }

    #[test]
    fn test_upgrade_keeps_custom_port_and_drops_80() {
        assert_eq!(
            decide("http://imagetovideo-ai.net:8443/x"),
            redirect("https://imagetovideo-ai.net:8443/x", RedirectReason::SecureScheme)
        );
        assert_eq!(
            decide("http://imagetovideo-ai.net:80/x"),
            redirect("https://imagetovideo-ai.net/x", RedirectReason::SecureScheme)
        );
    }

    #[test]
    fn test_missing_host() {
        let n = normalizer();
        let secure = RequestDescriptor::new("", Scheme::Https, "/pricing");
        assert_eq!(n.decide(&secure), Decision::Delegate);

        let insecure = RequestDescriptor::new("", Scheme::Http, "/pricing");
        assert_eq!(
            n.decide(&insecure),
            redirect("https://imagetovideo-ai.net/pricing", RedirectReason::SecureScheme)
        );
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(names, ["canonical_host", "secure_scheme", "delegate"]);

        let n = normalizer();
        let req = RequestDescriptor::from_url("http://www.imagetovideo-ai.net/").unwrap();
        assert_eq!(n.matching_rule(&req).map(|r| r.name), Some("canonical_host"));
    }

    #[test]
    fn test_redirect_targets_are_fixed_points() {
        let n = normalizer();
        let hosts = [
            "www.imagetovideo-ai.net",
            "www.imagetovideo-ai.net:8080",
            "imagetovideo-ai.net",
            "imagetovideo-ai.net:80",
            "imagetovideo-ai.net:3000",
            "preview.imagetovideo-ai.net",
            "127.0.0.1:8080",
            "[::1]:8080",
            "",
        ];
        let targets = ["/", "/text-to-video?x=1", "/zh/posts/abc", "/a/b/c?q=1&r=%20"];

        for host in hosts {
            for scheme in [Scheme::Http, Scheme::Https] {
                for target in targets {
                    let req = RequestDescriptor::new(host, scheme, target);
                    let decision = n.decide(&req);

                    let must_redirect = req.hostname() == "www.imagetovideo-ai.net" || !scheme.is_secure();
                    assert_eq!(decision.is_redirect(), must_redirect, "{}", req.url());

                    if let Decision::Redirect { location, status, .. } = decision {
                        assert_eq!(status, StatusCode::PERMANENT_REDIRECT);
                        let next = RequestDescriptor::from_url(&location).unwrap();
                        assert_eq!(next.scheme, Scheme::Https);
                        assert_eq!(next.path_and_query, target);
                        assert_eq!(n.decide(&next), Decision::Delegate, "loop via {}", location);
                    }
                }
            }
        }
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port("example.com"), ("example.com", None));
        assert_eq!(split_host_port("example.com:8080"), ("example.com", Some("8080")));
        assert_eq!(split_host_port("[::1]:443"), ("[::1]", Some("443")));
        assert_eq!(split_host_port("[::1]"), ("[::1]", None));
        assert_eq!(split_host_port(""), ("", None));
    }

    #[test]
    fn test_scheme_parse() {
        assert_eq!(Scheme::parse("HTTPS"), Some(Scheme::Https));
        assert_eq!(Scheme::parse(" http "), Some(Scheme::Http));
        assert_eq!(Scheme::parse("gopher"), None);
    }
}
