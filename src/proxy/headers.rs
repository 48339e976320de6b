//! Header construction for both proxy directions.
//!
//! [`build_upstream_headers`] derives a fresh outbound header set from
//! the inbound request (never mutating it in place), stripping
//! hop-by-hop and platform-identifying headers;
//! [`set_attribution_headers`] re-injects the forwarded client metadata
//! the analytics origin uses for attribution. On the way back,
//! [`strip_response_hop_by_hop`] and [`set_security_headers`] shape the
//! client-facing response.

use std::sync::LazyLock;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Removed from every upstream request: transport-scoped headers plus the
/// markers an edge platform uses to identify itself or the client. The
/// outbound connector negotiates its own compression and sets its own
/// `Host` / `Content-Length` for the target.
static STRIP_FORWARD: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "host",
        "content-length",
        "x-real-ip",
        "cf-connecting-ip",
        "x-forwarded-proto",
        "accept-encoding",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

/// Additionally removed on the script route so the upstream always returns
/// a full cacheable body rather than a 304.
static STRIP_CONDITIONAL: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    ["if-none-match", "if-modified-since", "cache-control"]
        .iter()
        .filter_map(|name| name.parse::<HeaderName>().ok())
        .collect()
});

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

pub const CACHE_SCRIPT: &str = "public, max-age=3600, s-maxage=3600, immutable";
pub const CACHE_NONE: &str = "no-store";

/// Build the outbound-to-upstream header set.
///
/// `strip_conditional` is set on the script route only.
#[must_use]
pub fn build_upstream_headers(original: &HeaderMap, strip_conditional: bool) -> HeaderMap {
    let mut headers = original.clone();

    for name in STRIP_FORWARD.iter() {
        headers.remove(name);
    }
    if strip_conditional {
        for name in STRIP_CONDITIONAL.iter() {
            headers.remove(name);
        }
    }

    headers
}

/// (Re)set the forwarded client metadata on a collect or measurement
/// request. The analytics origin attributes hits by these values, and
/// absent sources become empty strings rather than being omitted so the
/// upstream never falls back to a header identifying this relay.
pub fn set_attribution_headers(headers: &mut HeaderMap, original: &HeaderMap, client_ip: &str) {
    let ip = HeaderValue::from_str(client_ip).unwrap_or_else(|_| HeaderValue::from_static(""));
    headers.insert("x-forwarded-for", ip);

    for name in ["user-agent", "referer"] {
        let value = original
            .get(name)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""));
        headers.insert(name, value);
    }
}

/// Strip hop-by-hop headers and `content-length` from an upstream response.
///
/// The body has already been fully collected by the dispatcher, so
/// `transfer-encoding` and `content-length` from the origin are no longer
/// accurate. Axum will set the correct `content-length` based on the actual
/// body bytes.
pub fn strip_response_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove(hyper::header::CONTENT_LENGTH);
}

/// Set the unconditional security headers and the content-type-gated
/// cache policy. Script bodies are cacheable for an hour; everything
/// else — the collection endpoints in particular — must never be cached
/// by clients or intermediaries.
pub fn set_security_headers(headers: &mut HeaderMap) {
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    let is_script = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("javascript"));
    let cache = if is_script { CACHE_SCRIPT } else { CACHE_NONE };
    headers.insert("cache-control", HeaderValue::from_static(cache));
}
