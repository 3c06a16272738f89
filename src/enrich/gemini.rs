// src/enrich/gemini.rs
//! Gemini `generateContent` with Google Search grounding.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{Citation, EnrichmentRequest, MarketReport, ReportClient};
use crate::config::AiConfig;

/// Requires an API key (`GEMINI_API_KEY` via the `"ENV"` sentinel).
pub struct GeminiProvider {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn from_config(cfg: &AiConfig, timeout: Duration) -> Result<Self> {
        Self::new(&cfg.api_base, &cfg.api_key, &cfg.model, timeout)
    }

    pub fn new(api_base: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("mandi-market-engine/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("building gemini http client")?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    async fn generate_impl(&self, req: &EnrichmentRequest) -> Option<MarketReport> {
        if self.api_key.is_empty() {
            return None;
        }

        let prompt = req.prompt();
        let system = req.system_instruction();
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: &system }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &prompt }],
            }],
            tools: vec![Tool {
                google_search: EmptyObject {},
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);
        let resp = match self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(target: "enrich", error = %e, "gemini request failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            let status = resp.status();
            tracing::warn!(target: "enrich", %status, "gemini returned non-success status");
            return None;
        }

        let payload: GenerateResponse = match resp.json().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(target: "enrich", error = %e, "gemini response parse failed");
                return None;
            }
        };
        report_from_response(payload)
    }
}

impl ReportClient for GeminiProvider {
    fn generate<'a>(
        &'a self,
        req: &'a EnrichmentRequest,
    ) -> Pin<Box<dyn Future<Output = Option<MarketReport>> + Send + 'a>> {
        Box::pin(self.generate_impl(req))
    }
    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

// ------------------------------------------------------------
// Wire types
// ------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Tool {
    google_search: EmptyObject,
}

#[derive(Serialize)]
struct EmptyObject {}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// First candidate's text parts joined; citations from its grounding chunks,
/// keeping only chunks with a URL and the first occurrence of each URL.
fn report_from_response(payload: GenerateResponse) -> Option<MarketReport> {
    let candidate = payload.candidates.into_iter().next()?;

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut seen = HashSet::new();
    let citations = candidate
        .grounding_metadata
        .map(|g| g.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| {
            let url = web.uri.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;
            Some(Citation {
                title: web.title.unwrap_or_default().trim().to_string(),
                url,
            })
        })
        .filter(|c| seen.insert(c.url.clone()))
        .collect();

    Some(MarketReport {
        narrative_text: Some(text.to_string()),
        citations,
    })
}
