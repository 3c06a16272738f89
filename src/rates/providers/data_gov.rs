use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::DatasetConfig;
use crate::location::LocationFilter;
use crate::rates::types::{PriceRecord, RateSource};

/// Envelope returned by the data.gov.in resource API.
#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    records: Option<Vec<PriceRecord>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Mandi price provider backed by the data.gov.in resource API.
pub struct DataGovProvider {
    mode: Mode,
    limit: u32,
}

enum Mode {
    // Own copy of the payload so tests can hand in any &str.
    Fixture(String),
    Http {
        client: reqwest::Client,
        base_url: String,
        resource_id: String,
        api_key: String,
    },
}

impl DataGovProvider {
    pub fn from_config(cfg: &DatasetConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("mandi-market-engine/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("building dataset http client")?;
        Ok(Self {
            mode: Mode::Http {
                client,
                base_url: cfg.base_url.trim_end_matches('/').to_string(),
                resource_id: cfg.resource_id.clone(),
                api_key: cfg.api_key.clone(),
            },
            limit: cfg.limit,
        })
    }

    /// Serve reads from an in-memory JSON payload, filtered the way upstream would.
    pub fn from_fixture_str(payload: &str, limit: u32) -> Self {
        Self {
            mode: Mode::Fixture(payload.to_string()),
            limit,
        }
    }

    fn parse_payload(body: &str) -> Result<Vec<PriceRecord>> {
        let payload: Payload = serde_json::from_str(body).context("parsing mandi dataset json")?;
        if let Some(err) = payload.error.filter(|e| !e.trim().is_empty()) {
            bail!("dataset error: {err}");
        }
        if payload.status.as_deref() == Some("error") {
            bail!(
                "dataset error: {}",
                payload.message.unwrap_or_else(|| "unknown".to_string())
            );
        }
        Ok(payload.records.unwrap_or_default())
    }

    fn query_params(filter: &LocationFilter, api_key: &str, limit: u32) -> Vec<(String, String)> {
        let mut q = vec![
            ("api-key".to_string(), api_key.to_string()),
            ("format".to_string(), "json".to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        let fields = [
            ("commodity", &filter.commodity),
            ("state", &filter.state),
            ("district", &filter.district),
            ("market", &filter.market),
        ];
        for (name, value) in fields {
            if let Some(v) = value {
                q.push((format!("filters[{name}]"), v.clone()));
            }
        }
        q
    }
}

#[async_trait]
impl RateSource for DataGovProvider {
    async fn fetch(&self, filter: &LocationFilter) -> Result<Vec<PriceRecord>> {
        match &self.mode {
            Mode::Fixture(s) => {
                let records = Self::parse_payload(s)?;
                Ok(records
                    .into_iter()
                    .filter(|r| matches_filter(r, filter))
                    .take(self.limit as usize)
                    .collect())
            }
            Mode::Http {
                client,
                base_url,
                resource_id,
                api_key,
            } => {
                if api_key.is_empty() {
                    bail!("missing DATA_GOV_API_KEY");
                }
                let url = format!("{base_url}/resource/{resource_id}");
                let resp = client
                    .get(&url)
                    .query(&Self::query_params(filter, api_key, self.limit))
                    .send()
                    .await
                    .context("dataset http get()")?;
                let status = resp.status();
                if !status.is_success() {
                    bail!("dataset http status {status}");
                }
                let body = resp.text().await.context("dataset http .text()")?;
                Self::parse_payload(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "data.gov.in"
    }
}

fn matches_filter(r: &PriceRecord, f: &LocationFilter) -> bool {
    let eq = |want: &Option<String>, have: &str| {
        want.as_deref()
            .map_or(true, |w| w.trim().eq_ignore_ascii_case(have.trim()))
    };
    eq(&f.commodity, &r.commodity)
        && eq(&f.state, &r.state)
        && eq(&f.district, &r.district)
        && eq(&f.market, &r.market)
}
