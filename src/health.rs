//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload containing the server
//! version, uptime, a summary of the resolved proxy configuration, and
//! cumulative request statistics.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub config: ConfigHealth,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct ConfigHealth {
    pub allowed_origins: usize,
    pub cookie_name: String,
    pub cookie_domain: Option<String>,
    pub force_region: bool,
    pub collect_base: String,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub requests_proxied: u64,
    pub requests_failed: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let config = &state.config;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        config: ConfigHealth {
            allowed_origins: config.allowed_origins.len(),
            cookie_name: config.cookie_name.clone(),
            cookie_domain: config.cookie_domain.clone(),
            force_region: config.force_region,
            collect_base: config.collect_base().to_string(),
        },
        stats: StatsResponse {
            requests_proxied: state.stats.proxied.load(Ordering::Relaxed),
            requests_failed: state.stats.failed.load(Ordering::Relaxed),
        },
    })
}
