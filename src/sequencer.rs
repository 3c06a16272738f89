// src/sequencer.rs
//! Supersession of in-flight queries.
//!
//! Every query takes a ticket from a monotonically increasing counter. When a query
//! completes, its result is only handed out if no newer ticket was issued meanwhile.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use metrics::counter;

use crate::aggregator::{MarketEngine, ResolvedMarketView};
use crate::language::Language;
use crate::metrics::ensure_metrics_described;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryTicket(u64);

impl QueryTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct QuerySequencer {
    latest: AtomicU64,
}

impl QuerySequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> QueryTicket {
        QueryTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// One caller's view of the engine (e.g. one dashboard screen). Only the most
/// recently issued query's result is delivered.
pub struct MarketSession {
    engine: Arc<MarketEngine>,
    sequencer: QuerySequencer,
}

impl MarketSession {
    pub fn new(engine: Arc<MarketEngine>) -> Self {
        Self {
            engine,
            sequencer: QuerySequencer::new(),
        }
    }

    /// `None` when a newer query was issued before this one resolved.
    pub async fn query(
        &self,
        location_text: &str,
        commodity_text: &str,
        language: Language,
    ) -> Option<ResolvedMarketView> {
        let ticket = self.sequencer.issue();
        let view = self
            .engine
            .resolve_market(location_text, commodity_text, language)
            .await;

        if self.sequencer.is_current(ticket) {
            Some(view)
        } else {
            ensure_metrics_described();
            counter!("queries_superseded_total").increment(1);
            tracing::debug!(target: "market", seq = ticket.seq(), "stale market query dropped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_increase_and_only_latest_is_current() {
        let s = QuerySequencer::new();
        let a = s.issue();
        assert!(s.is_current(a));
        let b = s.issue();
        assert!(b > a);
        assert!(!s.is_current(a));
        assert!(s.is_current(b));
    }
}
