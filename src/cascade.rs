// src/cascade.rs
//! Cascade controller: walk the geographic levels from most to least specific and
//! stop at the first one that yields records.
//!
//! Levels run strictly one after another; level N+1 is only requested once level N
//! came back empty. A national read is only attempted without a commodity
//! constraint: an unfiltered national dump is never returned in place of a
//! crop-specific answer.

use metrics::counter;
use std::time::Duration;
use tracing::debug;

use crate::location::{GeoLevel, LocationFilter, ResolvedScope};
use crate::rates::fetch_rates;
use crate::rates::types::{PriceRecord, RateSource};

#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    pub records: Vec<PriceRecord>,
    pub scope: ResolvedScope,
    /// Scopes actually requested, in order.
    pub attempted: Vec<ResolvedScope>,
}

impl CascadeOutcome {
    pub fn unresolved() -> Self {
        Self {
            records: Vec::new(),
            scope: ResolvedScope::Unresolved,
            attempted: Vec::new(),
        }
    }
}

/// The filters the cascade may try for these levels and commodity, in order.
pub fn plan(levels: &[GeoLevel], commodity: &str) -> Vec<(ResolvedScope, LocationFilter)> {
    let has_commodity = !commodity.trim().is_empty();
    levels
        .iter()
        .filter(|level| !(has_commodity && matches!(level, GeoLevel::National)))
        .map(|level| (level.scope(), level.to_filter().with_commodity(commodity)))
        .collect()
}

pub async fn run_cascade(
    source: &dyn RateSource,
    levels: &[GeoLevel],
    commodity: &str,
    timeout: Duration,
) -> CascadeOutcome {
    let mut attempted = Vec::new();

    for (scope, filter) in plan(levels, commodity) {
        attempted.push(scope);
        let records = fetch_rates(source, &filter, timeout).await;
        debug!(target: "cascade", scope = scope.as_str(), records = records.len(), "level tried");
        if !records.is_empty() {
            counter!("cascade_resolved_total", "scope" => scope.as_str()).increment(1);
            return CascadeOutcome {
                records,
                scope,
                attempted,
            };
        }
    }

    counter!("cascade_resolved_total", "scope" => ResolvedScope::Unresolved.as_str()).increment(1);
    CascadeOutcome {
        records: Vec::new(),
        scope: ResolvedScope::Unresolved,
        attempted,
    }
}
