#![allow(dead_code)]
// Shared stubs for integration tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;

use mandi_market_engine::enrich::{EnrichmentRequest, MarketReport, ReportClient};
use mandi_market_engine::rates::types::{PriceRecord, RateSource};
use mandi_market_engine::{Citation, LocationFilter};

type Responder = Box<dyn Fn(&LocationFilter) -> Vec<PriceRecord> + Send + Sync>;

/// Rate source that records every filter it is asked for.
pub struct RecordingRateSource {
    pub calls: Mutex<Vec<LocationFilter>>,
    responder: Responder,
    delay: Option<(String, Duration)>,
}

impl RecordingRateSource {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&LocationFilter) -> Vec<PriceRecord> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            delay: None,
        }
    }

    pub fn always_empty() -> Self {
        Self::new(|_| Vec::new())
    }

    /// Sleep before answering when the filter's district or state equals `place`.
    pub fn with_delay_for(mut self, place: &str, delay: Duration) -> Self {
        self.delay = Some((place.to_string(), delay));
        self
    }

    pub fn calls(&self) -> Vec<LocationFilter> {
        self.calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl RateSource for RecordingRateSource {
    async fn fetch(&self, filter: &LocationFilter) -> Result<Vec<PriceRecord>> {
        self.calls.lock().push(filter.clone());
        if let Some((place, delay)) = &self.delay {
            let hit = filter.district.as_deref() == Some(place.as_str())
                || filter.state.as_deref() == Some(place.as_str());
            if hit {
                tokio::time::sleep(*delay).await;
            }
        }
        Ok((self.responder)(filter))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Report client that records requests and answers with a fixed report.
pub struct RecordingReportClient {
    pub requests: Mutex<Vec<EnrichmentRequest>>,
    pub answer: Option<MarketReport>,
}

impl RecordingReportClient {
    pub fn answering(text: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            answer: Some(MarketReport {
                narrative_text: Some(text.to_string()),
                citations: vec![Citation {
                    title: "Agmarknet".into(),
                    url: "https://agmarknet.gov.in".into(),
                }],
            }),
        }
    }

    pub fn failing() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            answer: None,
        }
    }

    pub fn requests(&self) -> Vec<EnrichmentRequest> {
        self.requests.lock().clone()
    }
}

impl ReportClient for RecordingReportClient {
    fn generate<'a>(
        &'a self,
        req: &'a EnrichmentRequest,
    ) -> Pin<Box<dyn Future<Output = Option<MarketReport>> + Send + 'a>> {
        self.requests.lock().push(req.clone());
        let out = self.answer.clone();
        Box::pin(async move { out })
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Rate source whose fetch blows up mid-flight.
pub struct PanickingRateSource;

#[async_trait::async_trait]
impl RateSource for PanickingRateSource {
    async fn fetch(&self, _filter: &LocationFilter) -> Result<Vec<PriceRecord>> {
        panic!("dataset backend exploded")
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Report client whose request blows up mid-flight.
pub struct PanickingReportClient;

impl ReportClient for PanickingReportClient {
    fn generate<'a>(
        &'a self,
        _req: &'a EnrichmentRequest,
    ) -> Pin<Box<dyn Future<Output = Option<MarketReport>> + Send + 'a>> {
        Box::pin(async { panic!("ai backend exploded") })
    }

    fn provider_name(&self) -> &'static str {
        "panicking"
    }
}

pub fn record(state: &str, district: &str, market: &str, commodity: &str) -> PriceRecord {
    PriceRecord {
        state: state.into(),
        district: district.into(),
        market: market.into(),
        commodity: commodity.into(),
        variety: "Local".into(),
        arrival_date: "18/10/2026".into(),
        min_price: "1000".into(),
        max_price: "1500".into(),
        modal_price: "1200".into(),
    }
}

pub fn records(n: usize, state: &str, district: &str, commodity: &str) -> Vec<PriceRecord> {
    (0..n)
        .map(|i| record(state, district, &format!("{district} #{i}"), commodity))
        .collect()
}

pub fn shared<T: RateSource + 'static>(source: T) -> (Arc<T>, Arc<dyn RateSource>) {
    let concrete = Arc::new(source);
    let dynamic: Arc<dyn RateSource> = concrete.clone();
    (concrete, dynamic)
}
