// src/rates/types.rs
use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};

use crate::location::LocationFilter;

/// One row of the mandi dataset. Values stay as the source sent them: prices are
/// strings because upstream formatting is inconsistent ("2450", "2,450", 2450).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct PriceRecord {
    #[serde(default, alias = "State", deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(default, alias = "District", deserialize_with = "lenient_string")]
    pub district: String,
    #[serde(default, alias = "Market", deserialize_with = "lenient_string")]
    pub market: String,
    #[serde(default, alias = "Commodity", deserialize_with = "lenient_string")]
    pub commodity: String,
    #[serde(default, alias = "Variety", deserialize_with = "lenient_string")]
    pub variety: String,
    #[serde(default, alias = "Arrival_Date", deserialize_with = "lenient_string")]
    pub arrival_date: String,
    #[serde(default, alias = "Min_Price", deserialize_with = "lenient_string")]
    pub min_price: String,
    #[serde(default, alias = "Max_Price", deserialize_with = "lenient_string")]
    pub max_price: String,
    #[serde(default, alias = "Modal_Price", deserialize_with = "lenient_string")]
    pub modal_price: String,
}

/// Accept strings, numbers and null; keep the textual form.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// A read-only source of price records for one filter combination.
///
/// Implementations report failures as `Err`; the fetch boundary in
/// [`crate::rates::fetch_rates`] turns them into "no data".
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self, filter: &LocationFilter) -> Result<Vec<PriceRecord>>;
    fn name(&self) -> &'static str;
}
