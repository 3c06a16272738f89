// tests/session_supersede.rs
//
// A query issued while an older one is still in flight wins; the older
// completion is dropped instead of being delivered.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{records, shared, RecordingRateSource, RecordingReportClient};
use mandi_market_engine::enrich::DynReportClient;
use mandi_market_engine::{Language, MarketEngine, MarketSession, ResolvedScope};

fn session_with_slow_state(slow_state: &str) -> MarketSession {
    let source = RecordingRateSource::new(|f| {
        let state = f.state.clone().unwrap_or_default();
        records(1, &state, "Any", "Onion")
    })
    .with_delay_for(slow_state, Duration::from_secs(3));
    let (_rates, rates_dyn) = shared(source);
    let ai: DynReportClient = Arc::new(RecordingReportClient::answering("ok"));
    let engine = MarketEngine::new(rates_dyn, ai, Duration::from_secs(9));
    MarketSession::new(Arc::new(engine))
}

#[tokio::test(start_paused = true)]
async fn stale_completion_is_discarded() {
    let session = session_with_slow_state("Bihar");

    let (first, second) = tokio::join!(
        session.query("Bihar", "Onion", Language::En),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            session.query("Punjab", "Onion", Language::En).await
        }
    );

    assert!(first.is_none(), "superseded query must not be delivered");
    let second = second.expect("latest query delivered");
    assert_eq!(second.resolved_scope, ResolvedScope::State);
    assert_eq!(second.records[0].state, "Punjab");
}

#[tokio::test]
async fn sequential_queries_are_all_delivered() {
    let session = session_with_slow_state("Nowhere");

    let a = session.query("Bihar", "Onion", Language::En).await;
    let b = session.query("Punjab", "Onion", Language::En).await;

    assert!(a.is_some());
    assert!(b.is_some());
}
