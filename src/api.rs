// src/api.rs
//! HTTP surface: `/health` and the `/market` query endpoint over a shared engine.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::aggregator::{MarketEngine, ResolvedMarketView};
use crate::config::EngineConfig;
use crate::language::Language;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MarketEngine>,
}

impl AppState {
    pub fn new(engine: MarketEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> Result<Self> {
        Ok(Self::new(MarketEngine::from_config(cfg)?))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/market", get(market))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Default, serde::Deserialize)]
struct MarketQuery {
    #[serde(default)]
    location: String,
    #[serde(default)]
    commodity: String,
    #[serde(default)]
    lang: String,
}

async fn market(
    State(state): State<AppState>,
    Query(q): Query<MarketQuery>,
) -> Json<ResolvedMarketView> {
    let language = Language::from_code_or_default(&q.lang);
    let view = state
        .engine
        .resolve_market(&q.location, &q.commodity, language)
        .await;
    Json(view)
}
