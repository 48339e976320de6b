//! Core relay handler.
//!
//! [`relay_handler`] is the Axum fallback that receives every
//! non-`/health` request. It resolves the CORS decision, short-circuits
//! `OPTIONS` preflights, classifies the path, and hands matched routes
//! to the upstream dispatcher. Submodules implement route
//! classification ([`routing`]), the two header transforms
//! ([`headers`]), the allow-list CORS policy ([`cors`]), the identity
//! cookie ([`cookie`]), and target resolution/dispatch ([`upstream`]).
//!
//! Every failure past routing — cookie generation, request build, the
//! upstream call — collapses into a flat 502 with a fixed body, so no
//! upstream error detail or internal state reaches the client.

pub mod cookie;
pub mod cors;
pub mod headers;
pub mod routing;
pub mod upstream;

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::error::TagRelayError;
use crate::server::AppState;

use self::routing::ProxyRoute;
use self::upstream::UpstreamTarget;

const NOT_FOUND_BODY: &str = "Not found";
const BAD_GATEWAY_BODY: &str = "proxy error";

pub async fn relay_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    body: Bytes,
) -> Response {
    let config = &state.config;
    let correlation_id = req_headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    let allow = cors::resolve_origin(&req_headers, &config.allowed_origins);

    // Preflights answer for any path and never reach the routes.
    if method == Method::OPTIONS {
        return cors::preflight_response(&req_headers, allow);
    }

    let route = routing::classify(uri.path());
    let Some(target) = UpstreamTarget::resolve(route, config, &method, uri.query()) else {
        tracing::debug!(
            correlation_id = %correlation_id,
            method = %method,
            path = %uri.path(),
            "no route matched"
        );
        return plain_response(StatusCode::NOT_FOUND, NOT_FOUND_BODY, allow);
    };

    let client_ip = addr.ip().to_string();
    let request = RelayRequest {
        state: &state,
        route,
        target: &target,
        req_headers: &req_headers,
        body,
        client_ip: &client_ip,
        allow,
        correlation_id: &correlation_id,
    };

    match relay(request).await {
        Ok(response) => {
            state.stats.proxied.fetch_add(1, Ordering::Relaxed);
            response
        }
        Err(e) => {
            tracing::error!(
                correlation_id = %correlation_id,
                target = %target.url,
                error = %e,
                "relay failed"
            );
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            plain_response(StatusCode::BAD_GATEWAY, BAD_GATEWAY_BODY, allow)
        }
    }
}

struct RelayRequest<'a> {
    state: &'a AppState,
    route: ProxyRoute,
    target: &'a UpstreamTarget,
    req_headers: &'a HeaderMap,
    body: Bytes,
    client_ip: &'a str,
    allow: Option<&'a str>,
    correlation_id: &'a str,
}

async fn relay(req: RelayRequest<'_>) -> Result<Response, TagRelayError> {
    let config = &req.state.config;
    let is_script = req.route == ProxyRoute::Script;

    let mut upstream_headers = headers::build_upstream_headers(req.req_headers, is_script);
    if !is_script {
        headers::set_attribution_headers(&mut upstream_headers, req.req_headers, req.client_ip);
    }

    // Resolved before the upstream call: a dead random source fails the
    // request without burning an upstream attempt, and one resolution per
    // request keeps the Set-Cookie instruction unique.
    let identity = match req.route {
        ProxyRoute::Collect(_) => {
            let cookie_header = req.req_headers.get(COOKIE).and_then(|v| v.to_str().ok());
            Some(cookie::resolve(cookie_header, config)?)
        }
        _ => None,
    };

    let start = Instant::now();
    let (status, mut resp_headers, resp_body) = upstream::dispatch(
        &req.state.http_client,
        req.target,
        &upstream_headers,
        req.body,
    )
    .await?;

    tracing::info!(
        correlation_id = %req.correlation_id,
        target = %req.target.url,
        status = status.as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "upstream responded"
    );

    headers::strip_response_hop_by_hop(&mut resp_headers);
    headers::set_security_headers(&mut resp_headers);
    cors::apply(&mut resp_headers, req.allow);

    let mut builder = Response::builder().status(status);
    for (key, value) in &resp_headers {
        builder = builder.header(key, value);
    }
    if let Some(set_cookie) = identity.and_then(|i| i.set_cookie) {
        if let Ok(value) = HeaderValue::from_str(&set_cookie) {
            builder = builder.header(SET_COOKIE, value);
        }
    }

    builder
        .header("x-correlation-id", req.correlation_id)
        .body(axum::body::Body::from(resp_body))
        .map_err(|e| TagRelayError::HttpRequest {
            source: Box::new(e),
        })
}

/// Fixed-body response used for the 404 and 502 paths: security headers,
/// the CORS echo when the origin matched, nothing else.
fn plain_response(status: StatusCode, message: &'static str, allow: Option<&str>) -> Response {
    let mut headers = HeaderMap::new();
    headers::set_security_headers(&mut headers);
    cors::apply(&mut headers, allow);
    (status, headers, message).into_response()
}
