//! AI enrichment: grounded market commentary behind a provider abstraction.
//!
//! The boundary function [`enrich`] never fails. It skips the call entirely for an
//! empty commodity and answers every provider failure with [`FALLBACK_NARRATIVE`].

pub mod gemini;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::language::Language;
use crate::metrics::ensure_metrics_described;

pub use gemini::GeminiProvider;

pub const FALLBACK_NARRATIVE: &str = "Unable to fetch real-time market data for your query.";

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketReport {
    pub narrative_text: Option<String>,
    pub citations: Vec<Citation>,
}

impl MarketReport {
    pub fn fallback() -> Self {
        Self {
            narrative_text: Some(FALLBACK_NARRATIVE.to_string()),
            citations: Vec::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.narrative_text.as_deref() == Some(FALLBACK_NARRATIVE) && self.citations.is_empty()
    }
}

/// Inputs for one commentary request. `location` is the caller's raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRequest {
    pub commodity: String,
    pub location: String,
    pub language: Language,
}

impl EnrichmentRequest {
    pub fn prompt(&self) -> String {
        let location = match self.location.trim() {
            "" => crate::location::NATIONAL_SENTINEL,
            l => l,
        };
        format!(
            "Find current mandi prices and market trends for \"{}\" in and around {}. Provide a summary for a farmer in {}.",
            self.commodity,
            location,
            self.language.display_name()
        )
    }

    pub fn system_instruction(&self) -> String {
        format!(
            "You are KisanSathi, an expert agricultural assistant. Provide helpful, accurate, and practical farming advice in {}. Keep responses concise and use a friendly, encouraging tone suitable for a farmer.",
            self.language.display_name()
        )
    }
}

/// Trait object used by the aggregator (and stubbed in tests).
pub trait ReportClient: Send + Sync {
    /// Issue one grounded request. `None` means "no usable answer".
    fn generate<'a>(
        &'a self,
        req: &'a EnrichmentRequest,
    ) -> Pin<Box<dyn Future<Output = Option<MarketReport>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynReportClient = Arc<dyn ReportClient>;

/// Enrichment boundary. `None` only when the commodity is empty (no request issued);
/// otherwise a report is always returned, falling back on failure or timeout.
pub async fn enrich(
    client: &dyn ReportClient,
    req: &EnrichmentRequest,
    timeout: Duration,
) -> Option<MarketReport> {
    if req.commodity.trim().is_empty() {
        return None;
    }
    ensure_metrics_described();
    counter!("enrich_requests_total").increment(1);

    let report = match tokio::time::timeout(timeout, client.generate(req)).await {
        Ok(Some(report)) if report.narrative_text.is_some() => report,
        Ok(_) => {
            tracing::warn!(target: "enrich", provider = client.provider_name(), "no usable commentary; using fallback");
            counter!("enrich_fallback_total").increment(1);
            MarketReport::fallback()
        }
        Err(_) => {
            tracing::warn!(
                target: "enrich",
                provider = client.provider_name(),
                timeout_ms = timeout.as_millis() as u64,
                "commentary timed out; using fallback"
            );
            counter!("enrich_fallback_total").increment(1);
            MarketReport::fallback()
        }
    };
    Some(report)
}

/// Factory: build a client according to config and environment variables.
///
/// * If `AI_TEST_MODE=mock`, returns a deterministic mock client.
/// * Else if `config.enabled==false`, returns a disabled client.
/// * Else builds the configured provider (`gemini`, or `disabled`).
pub fn build_report_client(config: &AiConfig, timeout: Duration) -> DynReportClient {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(MockReportClient::default());
    }

    if !config.enabled {
        return Arc::new(DisabledClient);
    }

    match config.provider.as_str() {
        "disabled" => Arc::new(DisabledClient),
        "gemini" => match GeminiProvider::from_config(config, timeout) {
            Ok(p) => Arc::new(p),
            Err(e) => {
                tracing::warn!(target: "enrich", error = ?e, "gemini client init failed; AI disabled");
                Arc::new(DisabledClient)
            }
        },
        other => {
            tracing::warn!(target: "enrich", provider = other, "unknown AI provider; AI disabled");
            Arc::new(DisabledClient)
        }
    }
}

// ------------------------------------------------------------
// Trivial clients
// ------------------------------------------------------------

/// Returns `None` always; used when AI is disabled.
pub struct DisabledClient;

impl ReportClient for DisabledClient {
    fn generate<'a>(
        &'a self,
        _req: &'a EnrichmentRequest,
    ) -> Pin<Box<dyn Future<Output = Option<MarketReport>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic client for tests/local runs.
#[derive(Clone)]
pub struct MockReportClient {
    pub fixed: MarketReport,
}

impl Default for MockReportClient {
    fn default() -> Self {
        Self {
            fixed: MarketReport {
                narrative_text: Some("Prices steady this week (mock).".to_string()),
                citations: vec![Citation {
                    title: "Agmarknet".to_string(),
                    url: "https://agmarknet.gov.in".to_string(),
                }],
            },
        }
    }
}

impl ReportClient for MockReportClient {
    fn generate<'a>(
        &'a self,
        _req: &'a EnrichmentRequest,
    ) -> Pin<Box<dyn Future<Output = Option<MarketReport>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
