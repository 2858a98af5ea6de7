//! HTTP API handlers.
//!
//! The health handler is the one piece of server code this repository
//! owns: it classifies the request origin against the configured
//! allow-list, emits CORS headers, short-circuits preflights, and
//! reports process health as JSON.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::cors::{AllowList, OriginMatch};
use crate::metrics;

/// Fallback app identifier when the request carries no `X-App-ID`.
const UNKNOWN_APP_ID: &str = "Unknown";

/// Fixed method list advertised on every response.
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Fixed header list advertised on every response.
const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-App-ID";

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Read-only process configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new app state from configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Health check response (success case).
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
    /// ISO-8601 timestamp captured at request entry.
    pub timestamp: String,
    /// Caller-supplied app identifier.
    #[serde(rename = "appId")]
    pub app_id: String,
    /// Hosted backend state, fixed literal.
    pub manifest: &'static str,
    /// Backend version, fixed literal.
    pub version: &'static str,
    /// Deployment environment name.
    pub environment: String,
    /// Configured port, as a string.
    pub port: String,
}

/// Health check response (failure case).
#[derive(Debug, Serialize)]
pub struct HealthErrorResponse {
    /// Status: "error".
    pub status: &'static str,
    /// ISO-8601 timestamp captured at request entry.
    pub timestamp: String,
    /// Caller-supplied app identifier.
    #[serde(rename = "appId")]
    pub app_id: String,
    /// Error message.
    pub error: String,
}

/// ISO-8601 timestamp for "now", empty on the (unreachable in
/// practice) formatting failure so the handler can never panic.
fn iso_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Case-insensitive header lookup, decoded as UTF-8.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// CORS headers computed for one request.
fn cors_headers(origin_match: &OriginMatch) -> Vec<(header::HeaderName, HeaderValue)> {
    let mut out = Vec::with_capacity(4);

    match origin_match {
        OriginMatch::Wildcard => {
            out.push((
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ));
        }
        OriginMatch::Exact(origin) => {
            // A matched origin came off the wire as a header value, so
            // re-encoding it cannot fail; skip it if it somehow does.
            if let Ok(value) = HeaderValue::from_str(origin) {
                out.push((header::ACCESS_CONTROL_ALLOW_ORIGIN, value));
            }
        }
        OriginMatch::NoMatch => {}
    }

    out.push((
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    ));
    out.push((
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    ));
    out.push((header::VARY, HeaderValue::from_static("Origin")));

    out
}

/// Origin-aware health reporter, mounted method-agnostic.
///
/// `OPTIONS` requests get an empty 204; everything else gets the JSON
/// health payload with 200, or the JSON error payload with 500 if
/// assembly fails. CORS headers are set per the allow-list either way.
pub async fn health(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    let timestamp = iso_timestamp();
    let app_id = header_str(&headers, "x-app-id")
        .unwrap_or(UNKNOWN_APP_ID)
        .to_string();
    let origin = header_str(&headers, "origin");

    debug!(%method, app_id = %app_id, origin = ?origin, "health check requested");
    metrics::inc_health_requests();

    let allow_list = AllowList::parse(&state.config.allowed_origins);
    let origin_match = allow_list.match_origin(origin);

    if !origin_match.is_allowed() {
        info!(origin = ?origin, allowed = ?allow_list.patterns(), "origin not allowed");
        metrics::inc_origins_denied();
    }

    let headers_out = cors_headers(&origin_match);

    if method == Method::OPTIONS {
        debug!("preflight request, responding 204");
        metrics::inc_preflight_requests();
        return with_headers((StatusCode::NO_CONTENT, ()).into_response(), headers_out);
    }

    let payload = HealthResponse {
        status: "ok",
        timestamp: timestamp.clone(),
        app_id: app_id.clone(),
        manifest: "running",
        version: "1.0.0",
        environment: state.config.node_env.clone(),
        port: state.config.port.to_string(),
    };

    // Serialize explicitly so an assembly failure becomes the JSON
    // error payload rather than a bare 500.
    match serde_json::to_value(&payload) {
        Ok(body) => {
            debug!(app_id = %app_id, "health check successful");
            with_headers((StatusCode::OK, Json(body)).into_response(), headers_out)
        }
        Err(e) => {
            error!(error = %e, "health payload assembly failed");
            metrics::inc_health_failures();
            let body = HealthErrorResponse {
                status: "error",
                timestamp,
                app_id,
                error: e.to_string(),
            };
            with_headers(
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response(),
                headers_out,
            )
        }
    }
}

/// Attach computed headers to a response.
fn with_headers(
    mut response: Response,
    headers: Vec<(header::HeaderName, HeaderValue)>,
) -> Response {
    for (name, value) in headers {
        response.headers_mut().insert(name, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_timestamp_is_rfc3339() {
        let ts = iso_timestamp();
        assert!(OffsetDateTime::parse(&ts, &Rfc3339).is_ok());
    }

    #[test]
    fn cors_headers_wildcard_sets_star() {
        let headers = cors_headers(&OriginMatch::Wildcard);
        let acao = headers
            .iter()
            .find(|(n, _)| *n == header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|(_, v)| v.to_str().unwrap().to_string());
        assert_eq!(acao.as_deref(), Some("*"));
    }

    #[test]
    fn cors_headers_exact_echoes_origin() {
        let headers = cors_headers(&OriginMatch::Exact("https://a.example.com".to_string()));
        let acao = headers
            .iter()
            .find(|(n, _)| *n == header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|(_, v)| v.to_str().unwrap().to_string());
        assert_eq!(acao.as_deref(), Some("https://a.example.com"));
    }

    #[test]
    fn cors_headers_no_match_omits_allow_origin() {
        let headers = cors_headers(&OriginMatch::NoMatch);
        assert!(!headers
            .iter()
            .any(|(n, _)| *n == header::ACCESS_CONTROL_ALLOW_ORIGIN));
        // The fixed headers are still present.
        assert!(headers.iter().any(|(n, _)| *n == header::VARY));
        assert!(headers
            .iter()
            .any(|(n, _)| *n == header::ACCESS_CONTROL_ALLOW_METHODS));
    }
}
