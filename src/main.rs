//! Mandi market service: binary entrypoint.
//! Boots the Axum HTTP server with the market engine, metrics and CORS.

use mandi_market_engine::{api, config::EngineConfig, metrics::Metrics};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `MANDI_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mandi_market_engine=info,warn"));

    let json = std::env::var("MANDI_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    // Shuttle may already have installed a subscriber; keep whichever came first.
    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = EngineConfig::load_default()?;
    let metrics = Metrics::init(cfg.runtime.timeout_ms, cfg.runtime.rate_cache_ttl_ms)?;

    let state = api::AppState::from_config(&cfg)?;
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
