// src/aggregator.rs
//! Result aggregator: runs the cascade and the AI enrichment side by side and merges
//! whatever each branch produced into one [`ResolvedMarketView`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use metrics::gauge;
use serde::Serialize;
use tokio::task::AbortHandle;
use tracing::{info, warn};

use crate::cascade::{run_cascade, CascadeOutcome};
use crate::commodity::normalize_commodity;
use crate::config::EngineConfig;
use crate::enrich::{build_report_client, enrich, DynReportClient, EnrichmentRequest, MarketReport};
use crate::language::Language;
use crate::location::{resolve_levels, ResolvedScope};
use crate::rates::cache::CachedRateSource;
use crate::rates::providers::data_gov::DataGovProvider;
use crate::rates::types::{PriceRecord, RateSource};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMarketView {
    pub records: Vec<PriceRecord>,
    pub report: Option<MarketReport>,
    pub resolved_scope: ResolvedScope,
}

/// Holds the two outbound seams. Cheap to share behind an `Arc`; no per-query state.
pub struct MarketEngine {
    rates: Arc<dyn RateSource>,
    reports: DynReportClient,
    timeout: Duration,
}

impl MarketEngine {
    pub fn new(rates: Arc<dyn RateSource>, reports: DynReportClient, timeout: Duration) -> Self {
        Self {
            rates,
            reports,
            timeout,
        }
    }

    /// Wire the data.gov.in provider (optionally memoized) and the configured AI client.
    pub fn from_config(cfg: &EngineConfig) -> Result<Self> {
        let timeout = cfg.timeout();
        let provider: Arc<dyn RateSource> =
            Arc::new(DataGovProvider::from_config(&cfg.dataset, timeout)?);
        let rates: Arc<dyn RateSource> = match cfg.rate_cache_ttl() {
            Some(ttl) => Arc::new(CachedRateSource::new(provider, ttl)),
            None => provider,
        };
        let reports = build_report_client(&cfg.ai, timeout);
        info!(
            target: "market",
            rates = rates.name(),
            ai = reports.provider_name(),
            timeout_ms = cfg.runtime.timeout_ms,
            "market engine ready"
        );
        Ok(Self::new(rates, reports, timeout))
    }

    /// `resolveMarket(locationText, commodityText, language)`.
    ///
    /// Both branches are spawned and jointly awaited. A branch that panics is
    /// replaced by its empty outcome; the other branch's result is kept. Dropping
    /// the returned future aborts whichever branch is still running.
    pub async fn resolve_market(
        &self,
        location_text: &str,
        commodity_text: &str,
        language: Language,
    ) -> ResolvedMarketView {
        let levels = resolve_levels(location_text);
        let commodity = normalize_commodity(commodity_text);
        let timeout = self.timeout;

        let cascade = {
            let rates = Arc::clone(&self.rates);
            let commodity = commodity.clone();
            tokio::spawn(async move { run_cascade(rates.as_ref(), &levels, &commodity, timeout).await })
        };

        let request = EnrichmentRequest {
            commodity: commodity.clone(),
            location: location_text.trim().to_string(),
            language,
        };
        let enrichment = {
            let reports = Arc::clone(&self.reports);
            tokio::spawn(async move { enrich(reports.as_ref(), &request, timeout).await })
        };

        // Dropping this future (client gone, query superseded) cancels both branches.
        let _guard = AbortOnDrop(vec![cascade.abort_handle(), enrichment.abort_handle()]);
        let (cascade, enrichment) = tokio::join!(cascade, enrichment);

        let outcome = cascade.unwrap_or_else(|e| {
            warn!(target: "market", error = %e, "cascade branch failed");
            CascadeOutcome::unresolved()
        });
        let report = enrichment.unwrap_or_else(|e| {
            warn!(target: "market", error = %e, "enrichment branch failed");
            (!commodity.is_empty()).then(MarketReport::fallback)
        });

        gauge!("market_last_query_ts").set(chrono::Utc::now().timestamp() as f64);
        info!(
            target: "market",
            query = %query_id(location_text, &commodity),
            scope = outcome.scope.as_str(),
            attempted = ?outcome.attempted,
            records = outcome.records.len(),
            report = report.is_some(),
            lang = language.code(),
            "market query resolved"
        );

        ResolvedMarketView {
            records: outcome.records,
            report,
            resolved_scope: outcome.scope,
        }
    }
}

struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Short anonymized id for logs; raw location text is never logged.
pub(crate) fn query_id(location: &str, commodity: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(location.trim().as_bytes());
    hasher.update([0u8]);
    hasher.update(commodity.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
