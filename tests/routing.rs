//! Integration tests for route classification and upstream target resolution.

use axum::http::Method;
use tagrelay::config::ProxyConfig;
use tagrelay::proxy::routing::{classify, CollectVariant, ProxyRoute};
use tagrelay::proxy::upstream::UpstreamTarget;

fn make_config() -> ProxyConfig {
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
fn exactly_one_route_per_path() {
    let cases = [
        ("/gtag/js", ProxyRoute::Script),
        ("/g/collect", ProxyRoute::Collect(CollectVariant::G)),
        ("/j/collect", ProxyRoute::Collect(CollectVariant::J)),
        ("/r/collect", ProxyRoute::Collect(CollectVariant::R)),
        ("/mp/collect", ProxyRoute::Measurement),
        ("/", ProxyRoute::NotFound),
        ("/favicon.ico", ProxyRoute::NotFound),
        ("/g/collect/extra", ProxyRoute::NotFound),
        ("/gtag/js/", ProxyRoute::NotFound),
        ("/Mp/collect", ProxyRoute::NotFound),
    ];

    for (path, expected) in cases {
        assert_eq!(classify(path), expected, "path {path}");
    }
}

#[test]
fn classification_ignores_query_semantics() {
    // The query string never participates in routing; it is resolved into
    // the target URL untouched.
    let target = UpstreamTarget::resolve(
        classify("/g/collect"),
        &make_config(),
        &Method::POST,
        Some("v=2&tid=G-ABC123&cid=555"),
    )
    .unwrap();
    assert_eq!(
        target.url,
        "https://www.google-analytics.com/g/collect?v=2&tid=G-ABC123&cid=555"
    );
}

#[test]
fn script_target_normalizes_method_to_get() {
    let target = UpstreamTarget::resolve(
        ProxyRoute::Script,
        &make_config(),
        &Method::POST,
        Some("id=G-ABC123"),
    )
    .unwrap();
    assert_eq!(target.method, Method::GET);
    assert_eq!(
        target.url,
        "https://www.googletagmanager.com/gtag/js?id=G-ABC123"
    );
}

#[test]
fn collect_target_never_widens_method() {
    let config = make_config();
    for method in [Method::GET, Method::POST] {
        let target = UpstreamTarget::resolve(
            ProxyRoute::Collect(CollectVariant::G),
            &config,
            &method,
            None,
        )
        .unwrap();
        assert_eq!(target.method, method);
    }
}

#[test]
fn region_forcing_switches_collect_only() {
    let mut config = make_config();
    config.force_region = true;

    let collect = UpstreamTarget::resolve(
        ProxyRoute::Collect(CollectVariant::R),
        &config,
        &Method::GET,
        None,
    )
    .unwrap();
    assert!(collect.url.starts_with("https://region1.google-analytics.com"));

    let measurement =
        UpstreamTarget::resolve(ProxyRoute::Measurement, &config, &Method::POST, None).unwrap();
    assert!(measurement.url.starts_with("https://www.google-analytics.com"));

    let script =
        UpstreamTarget::resolve(ProxyRoute::Script, &config, &Method::GET, None).unwrap();
    assert!(script.url.starts_with("https://www.googletagmanager.com"));
}
