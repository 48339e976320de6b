//! Narrow allow-list CORS policy.
//!
//! The `Origin` header is compared against the configured allow-list by
//! exact string match — no wildcards, no subdomain matching. A match is
//! echoed back together with `Vary: Origin` on every response from that
//! point (error responses included) so caches never conflate responses
//! for different origins; a miss emits neither header.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS, ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Resolve the request's `Origin` against the allow-list.
#[must_use]
pub fn resolve_origin<'a>(headers: &HeaderMap, allowed: &'a [String]) -> Option<&'a str> {
    let origin = headers.get(ORIGIN)?.to_str().ok()?;
    allowed
        .iter()
        .find(|candidate| candidate.as_str() == origin)
        .map(String::as_str)
}

/// Apply the resolved decision to a response header set.
pub fn apply(headers: &mut HeaderMap, allow: Option<&str>) {
    let Some(origin) = allow else { return };
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }
}

/// Build the `OPTIONS` preflight response: 204, no body, the allowed
/// method set, the requested headers echoed verbatim (or `*`), and a
/// one-day cache on the decision.
#[must_use]
pub fn preflight_response(request_headers: &HeaderMap, allow: Option<&str>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    let requested = request_headers
        .get(ACCESS_CONTROL_REQUEST_HEADERS)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested);
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    apply(&mut headers, allow);

    (StatusCode::NO_CONTENT, headers).into_response()
}
