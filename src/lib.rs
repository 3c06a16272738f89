// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregator;
pub mod api;
pub mod cascade;
pub mod commodity;
pub mod config;
pub mod enrich;
pub mod language;
pub mod location;
pub mod metrics;
pub mod rates;
pub mod sequencer;

// ---- Re-exports for stable public API ----
pub use crate::aggregator::{MarketEngine, ResolvedMarketView};
pub use crate::api::router;
pub use crate::enrich::{Citation, MarketReport};
pub use crate::language::Language;
pub use crate::location::{LocationFilter, ResolvedScope};
pub use crate::rates::types::PriceRecord;
pub use crate::sequencer::MarketSession;

use axum::Router;

/// Build the HTTP app from `config/engine.toml` (or `$MANDI_CONFIG_PATH`) and env.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = config::EngineConfig::load_default()?;
    let state = api::AppState::from_config(&cfg)?;
    Ok(api::router(state))
}
