//! Page request normalization middleware.
//! Runs the normalizer and locale router before the page proxy.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, uri::PathAndQuery, HeaderName, HeaderValue, Request, Uri},
    middleware::Next,
    response::Response,
};

use crate::config::GatewayConfig;
use crate::http::request::{describe, request_id};
use crate::http::response::redirect;
use crate::observability::metrics;
use crate::routing::{Decision, Locale, LocaleRoute, LocaleRouter, Normalizer, PathScope, Scheme};

/// Everything the middleware needs, built once at startup.
#[derive(Debug)]
pub struct SiteRouting {
    pub scope: PathScope,
    pub normalizer: Normalizer,
    pub locales: LocaleRouter,
    pub locale_header: HeaderName,
    pub listener_scheme: Scheme,
    pub trust_forwarded_proto: bool,
}

impl SiteRouting {
    pub fn from_config(config: &GatewayConfig, listener_scheme: Scheme) -> Self {
        let locale_header = HeaderName::from_bytes(config.locales.header.as_bytes())
            .unwrap_or_else(|_| HeaderName::from_static("x-site-locale"));
        Self {
            scope: PathScope::from_config(&config.site),
            normalizer: Normalizer::new(config.site.canonical_host.clone()),
            locales: LocaleRouter::from_config(&config.locales),
            locale_header,
            listener_scheme,
            trust_forwarded_proto: config.site.trust_forwarded_proto,
        }
    }
}

pub async fn normalize_middleware(
    State(site): State<Arc<SiteRouting>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Clients never get to pick the renderer locale themselves.
    req.headers_mut().remove(&site.locale_header);

    // 1. Out-of-scope paths (API, framework assets, files) pass straight through.
    if !site.scope.applies(req.uri().path()) {
        return next.run(req).await;
    }

    // 2. Canonical host and HTTPS.
    let descriptor = describe(&req, site.listener_scheme, site.trust_forwarded_proto);
    let decision = site.normalizer.decide(&descriptor);
    metrics::record_decision(decision.label());

    if let Decision::Redirect { location, status, reason } = decision {
        tracing::debug!(
            request_id = %request_id(&req),
            from = %descriptor.url(),
            to = %location,
            rule = reason.as_str(),
            "Normalizing request"
        );
        return redirect(status, &location);
    }

    // 3. Locale routing.
    let accept_language = req
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());

    let route = site.locales.route(&descriptor.path_and_query, accept_language);
    let outcome = route.label();
    match route {
        LocaleRoute::Redirect { locale, location, status } => {
            metrics::record_locale_route(outcome, &locale);
            redirect(status, &location)
        }
        LocaleRoute::Rewrite { locale, path_and_query } => {
            metrics::record_locale_route(outcome, &locale);
            if let Err(e) = rewrite_target(&mut req, &path_and_query) {
                tracing::warn!(path = %path_and_query, error = %e, "Locale rewrite produced an invalid URI");
            }
            if let Ok(value) = HeaderValue::from_str(&locale) {
                req.headers_mut().insert(site.locale_header.clone(), value);
            }
            req.extensions_mut().insert(Locale(locale));
            next.run(req).await
        }
    }
}

/// Replace the path and query of a request, keeping scheme and authority.
fn rewrite_target(req: &mut Request<Body>, path_and_query: &str) -> Result<(), axum::http::Error> {
    let mut parts = req.uri().clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    *req.uri_mut() = Uri::from_parts(parts)?;
    Ok(())
}
