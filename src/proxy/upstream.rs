//! Upstream target resolution and dispatch.
//!
//! [`UpstreamTarget::resolve`] computes the absolute URL and method for
//! the analytics origin from the classified route, the proxy config, and
//! the inbound request — the query string rides along byte-for-byte.
//! [`dispatch`] makes exactly one attempt against that target through
//! the pooled client: no retry, no application-level timeout, and no
//! status filtering — a non-2xx upstream response is a valid response
//! and passes through verbatim.

use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::StatusCode;

use crate::config::ProxyConfig;
use crate::error::TagRelayError;
use crate::proxy::routing::ProxyRoute;
use crate::server::HttpClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub url: String,
    pub method: Method,
}

impl UpstreamTarget {
    /// Resolve the upstream call for a proxied route. `None` for
    /// [`ProxyRoute::NotFound`], which has no upstream.
    ///
    /// The script route is always fetched with GET. Collect and
    /// measurement routes forward the inbound method as received —
    /// a GET beacon stays a GET and is never widened into a POST.
    #[must_use]
    pub fn resolve(
        route: ProxyRoute,
        config: &ProxyConfig,
        inbound_method: &Method,
        query: Option<&str>,
    ) -> Option<Self> {
        let search = query.map(|q| format!("?{q}")).unwrap_or_default();

        match route {
            ProxyRoute::Script => Some(Self {
                url: format!("{}/gtag/js{search}", config.script_origin),
                method: Method::GET,
            }),
            ProxyRoute::Collect(variant) => Some(Self {
                url: format!("{}{}{search}", config.collect_base(), variant.path()),
                method: inbound_method.clone(),
            }),
            ProxyRoute::Measurement => Some(Self {
                url: format!("{}/mp/collect{search}", config.collect_origin),
                method: inbound_method.clone(),
            }),
            ProxyRoute::NotFound => None,
        }
    }
}

/// Issue the upstream request and collect the full response.
pub async fn dispatch(
    client: &HttpClient,
    target: &UpstreamTarget,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, HeaderMap, Bytes), TagRelayError> {
    let mut builder = hyper::Request::builder()
        .method(target.method.clone())
        .uri(target.url.as_str());

    for (key, value) in headers {
        builder = builder.header(key, value);
    }

    let request = builder
        .body(Full::new(body))
        .map_err(|e| TagRelayError::UriParse {
            source: Box::new(e),
        })?;

    let response = client
        .request(request)
        .await
        .map_err(|e| TagRelayError::Upstream {
            source: Box::new(e),
        })?;

    let status = response.status();
    let response_headers = response.headers().clone();
    let body_bytes = response
        .into_body()
        .collect()
        .await
        .map_err(|e| TagRelayError::Upstream {
            source: Box::new(e),
        })?
        .to_bytes();

    Ok((status, response_headers, body_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::routing::CollectVariant;

    fn test_config() -> ProxyConfig {
        ProxyConfig {
            allowed_origins: vec![],
            cookie_name: "fpid".into(),
            cookie_domain: None,
            force_region: false,
            script_origin: "https://www.googletagmanager.com".into(),
            collect_origin: "https://www.google-analytics.com".into(),
            region_origin: "https://region1.google-analytics.com".into(),
        }
    }

    #[test]
    fn script_is_always_get() {
        let target = UpstreamTarget::resolve(
            ProxyRoute::Script,
            &test_config(),
            &Method::POST,
            Some("id=G-XYZ&l=dataLayer"),
        )
        .unwrap();

        assert_eq!(target.method, Method::GET);
        assert_eq!(
            target.url,
            "https://www.googletagmanager.com/gtag/js?id=G-XYZ&l=dataLayer"
        );
    }

    #[test]
    fn collect_preserves_inbound_method() {
        let config = test_config();
        let route = ProxyRoute::Collect(CollectVariant::G);

        let get = UpstreamTarget::resolve(route, &config, &Method::GET, None).unwrap();
        assert_eq!(get.method, Method::GET);

        let post = UpstreamTarget::resolve(route, &config, &Method::POST, None).unwrap();
        assert_eq!(post.method, Method::POST);
    }

    #[test]
    fn collect_url_uses_variant_path() {
        let target = UpstreamTarget::resolve(
            ProxyRoute::Collect(CollectVariant::J),
            &test_config(),
            &Method::POST,
            Some("v=2&tid=G-XYZ"),
        )
        .unwrap();
        assert_eq!(
            target.url,
            "https://www.google-analytics.com/j/collect?v=2&tid=G-XYZ"
        );
    }

    #[test]
    fn region_flag_switches_collect_host() {
        let mut config = test_config();
        config.force_region = true;

        let target = UpstreamTarget::resolve(
            ProxyRoute::Collect(CollectVariant::G),
            &config,
            &Method::POST,
            None,
        )
        .unwrap();
        assert_eq!(target.url, "https://region1.google-analytics.com/g/collect");
    }

    #[test]
    fn measurement_ignores_region_flag() {
        let mut config = test_config();
        config.force_region = true;

        let target =
            UpstreamTarget::resolve(ProxyRoute::Measurement, &config, &Method::POST, None)
                .unwrap();
        assert_eq!(target.url, "https://www.google-analytics.com/mp/collect");
    }

    #[test]
    fn query_rides_along_byte_for_byte() {
        let query = "v=2&tid=G-XYZ&en=page_view&ep.custom=a%20b";
        let target = UpstreamTarget::resolve(
            ProxyRoute::Collect(CollectVariant::R),
            &test_config(),
            &Method::GET,
            Some(query),
        )
        .unwrap();
        assert!(target.url.ends_with(&format!("/r/collect?{query}")));
    }

    #[test]
    fn not_found_has_no_upstream() {
        assert!(
            UpstreamTarget::resolve(ProxyRoute::NotFound, &test_config(), &Method::GET, None)
                .is_none()
        );
    }
}
