//! `tagrelay run` — start the proxy server.
//!
//! Resolves and validates the proxy configuration from flags and
//! environment variables, then serves the Axum router with graceful
//! shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::RunArgs;
use crate::config::ProxyConfig;
use crate::error::TagRelayError;
use crate::logging;
use crate::server::{self, AppState, Stats};

pub async fn execute(args: RunArgs) -> Result<(), TagRelayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let config = ProxyConfig::from_run_args(&args)?;

    if config.allowed_origins.is_empty() {
        tracing::warn!(
            "CORS allow-list is empty; cross-origin callers will never receive \
             Access-Control-Allow-Origin"
        );
    }

    let collect_base = config.collect_base().to_string();
    let allowed_origins = config.allowed_origins.len();
    let cookie_name = config.cookie_name.clone();

    let state = Arc::new(AppState {
        config: Arc::new(config),
        http_client: server::build_http_client(),
        start_time: Instant::now(),
        stats: Stats::new(),
    });

    let router = server::build_router(state, args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        allowed_origins,
        cookie = %cookie_name,
        collect_base = %collect_base,
        "tagrelay started"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("tagrelay stopped");
    Ok(())
}
