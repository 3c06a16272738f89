// src/config/engine.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{resolve_secret, AiConfig, DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH};

pub const DEFAULT_DATASET_BASE_URL: &str = "https://api.data.gov.in";
/// "Current Daily Price of Various Commodities from Various Markets (Mandi)".
pub const DEFAULT_RESOURCE_ID: &str = "9ef27c38-7da2-4302-abd4-4318391afc21";
pub const DEFAULT_RESULT_LIMIT: u32 = 50;
pub const DEFAULT_TIMEOUT_MS: u64 = 9_000;

const LIMIT_RANGE: std::ops::RangeInclusive<u32> = 1..=500;
const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 1_000..=30_000;

const ENV_RESULT_LIMIT: &str = "MANDI_RESULT_LIMIT";
const ENV_TIMEOUT_MS: &str = "MANDI_TIMEOUT_MS";
const ENV_RATE_CACHE_TTL_MS: &str = "MANDI_RATE_CACHE_TTL_MS";

fn default_base_url() -> String {
    DEFAULT_DATASET_BASE_URL.to_string()
}
fn default_resource_id() -> String {
    DEFAULT_RESOURCE_ID.to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_limit() -> u32 {
    DEFAULT_RESULT_LIMIT
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// `[dataset]` section: the structured mandi price resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_resource_id")]
    pub resource_id: String,
    /// "ENV" means: read from DATA_GOV_API_KEY
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Fixed result cap per read.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            resource_id: default_resource_id(),
            api_key: default_api_key(),
            limit: default_limit(),
        }
    }
}

/// `[runtime]` section: per-call timeout and optional memoization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// 0 disables the rate cache.
    #[serde(default)]
    pub rate_cache_ttl_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            rate_cache_ttl_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl EngineConfig {
    /// Parse an explicit TOML file, then apply env overrides and sanitization.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        let cfg: EngineConfig = toml::from_str(&data)
            .with_context(|| format!("parsing engine config {}", path.display()))?;
        Ok(cfg.finish())
    }

    /// Load using env var + fallbacks (see module docs).
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from_file(&default_p);
        }
        Ok(Self::default().finish())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.runtime.timeout_ms)
    }

    pub fn rate_cache_ttl(&self) -> Option<Duration> {
        (self.runtime.rate_cache_ttl_ms > 0)
            .then(|| Duration::from_millis(self.runtime.rate_cache_ttl_ms))
    }

    fn finish(mut self) -> Self {
        self.apply_env_overrides();
        self.sanitize();
        self.dataset.api_key = resolve_secret(&self.dataset.api_key, "DATA_GOV_API_KEY");
        self.ai.normalize();
        self
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = parse_env::<u32>(ENV_RESULT_LIMIT) {
            self.dataset.limit = v;
        }
        if let Some(v) = parse_env::<u64>(ENV_TIMEOUT_MS) {
            self.runtime.timeout_ms = v;
        }
        if let Some(v) = parse_env::<u64>(ENV_RATE_CACHE_TTL_MS) {
            self.runtime.rate_cache_ttl_ms = v;
        }
    }

    fn sanitize(&mut self) {
        if !LIMIT_RANGE.contains(&self.dataset.limit) {
            self.dataset.limit = default_limit();
        }
        if !TIMEOUT_RANGE_MS.contains(&self.runtime.timeout_ms) {
            self.runtime.timeout_ms = default_timeout_ms();
        }
        self.dataset.base_url = self.dataset.base_url.trim_end_matches('/').to_string();
        if self.dataset.base_url.is_empty() {
            self.dataset.base_url = default_base_url();
        }
        if self.dataset.resource_id.trim().is_empty() {
            self.dataset.resource_id = default_resource_id();
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}
