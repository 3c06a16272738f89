// src/config/ai.rs
use serde::{Deserialize, Serialize};

use super::resolve_secret;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-pro-preview";

fn default_enabled() -> bool {
    true
}
fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}
fn default_api_base() -> String {
    DEFAULT_GEMINI_API_BASE.to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}

/// `[ai]` section: grounded market commentary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// "gemini" | "disabled" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// "ENV" means: read from GEMINI_API_KEY
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: default_provider(),
            model: default_model(),
            api_base: default_api_base(),
            api_key: default_api_key(),
        }
    }
}

impl AiConfig {
    pub(crate) fn normalize(&mut self) {
        self.provider = self.provider.trim().to_lowercase();
        if self.model.trim().is_empty() {
            self.model = default_model();
        }
        if self.api_base.trim().is_empty() {
            self.api_base = default_api_base();
        }
        self.api_base = self.api_base.trim_end_matches('/').to_string();
        self.api_key = resolve_secret(&self.api_key, "GEMINI_API_KEY");
    }
}
