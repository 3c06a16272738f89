use anyhow::{anyhow, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and publish static config gauges.
    pub fn init(timeout_ms: u64, rate_cache_ttl_ms: u64) -> Result<Self> {
        // Use default buckets to avoid API differences across crate versions.
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow!("prometheus: install recorder: {e}"))?;

        ensure_metrics_described();
        gauge!("engine_call_timeout_ms").set(timeout_ms as f64);
        gauge!("engine_rate_cache_ttl_ms").set(rate_cache_ttl_ms as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("rates_fetch_total", "Structured dataset reads issued.");
        describe_counter!(
            "rates_fetch_errors_total",
            "Dataset reads normalized to no data (transport, status, parse, timeout)."
        );
        describe_histogram!("rates_fetch_ms", "Dataset read latency in milliseconds.");
        describe_counter!("rate_cache_hits_total", "Dataset reads served from memoization.");
        describe_counter!(
            "cascade_resolved_total",
            "Cascade runs by resolved scope (district/state/national/none)."
        );
        describe_counter!("enrich_requests_total", "Grounded commentary requests issued.");
        describe_counter!(
            "enrich_fallback_total",
            "Commentary requests answered with the fallback text."
        );
        describe_counter!(
            "queries_superseded_total",
            "Market queries discarded because a newer query was issued."
        );
        describe_gauge!("market_last_query_ts", "Unix ts of the last resolved market query.");
        describe_gauge!("engine_call_timeout_ms", "Per-call timeout for outbound requests.");
        describe_gauge!("engine_rate_cache_ttl_ms", "Rate memoization TTL (0 = disabled).");
    });
}
