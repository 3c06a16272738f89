// src/rates/mod.rs
//! Structured rate fetcher: one bounded read against the mandi dataset per filter.

pub mod cache;
pub mod providers;
pub mod types;

use metrics::{counter, histogram};
use std::time::Duration;
use tokio::time::Instant;

use crate::location::LocationFilter;
use crate::metrics::ensure_metrics_described;
use crate::rates::types::{PriceRecord, RateSource};

/// Fetch boundary. Never fails: transport, status, parse errors and timeouts all
/// come back as an empty sequence, which the cascade reads as "try broader".
/// Records are returned in source order.
pub async fn fetch_rates(
    source: &dyn RateSource,
    filter: &LocationFilter,
    timeout: Duration,
) -> Vec<PriceRecord> {
    ensure_metrics_described();
    counter!("rates_fetch_total").increment(1);

    let t0 = Instant::now();
    let out = match tokio::time::timeout(timeout, source.fetch(filter)).await {
        Ok(Ok(records)) => records,
        Ok(Err(e)) => {
            tracing::warn!(target: "rates", error = ?e, provider = source.name(), "rate fetch failed");
            counter!("rates_fetch_errors_total").increment(1);
            Vec::new()
        }
        Err(_) => {
            tracing::warn!(
                target: "rates",
                provider = source.name(),
                timeout_ms = timeout.as_millis() as u64,
                "rate fetch timed out"
            );
            counter!("rates_fetch_errors_total").increment(1);
            Vec::new()
        }
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("rates_fetch_ms").record(ms);
    tracing::debug!(target: "rates", provider = source.name(), records = out.len(), ms, "rate fetch done");
    out
}
