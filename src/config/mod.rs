// src/config/mod.rs
//! Engine configuration: TOML file + `.env`/environment overrides.
//!
//! Lookup order:
//! 1) $MANDI_CONFIG_PATH (must exist)
//! 2) config/engine.toml
//! 3) built-in defaults
//!
//! Secrets use the `"ENV"` sentinel and are read from the environment.

pub mod ai;
pub mod engine;

pub use ai::AiConfig;
pub use engine::{DatasetConfig, EngineConfig, RuntimeConfig};

use tracing::warn;

pub const ENV_CONFIG_PATH: &str = "MANDI_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/engine.toml";

/// Resolve a `"ENV"` sentinel from `env_var`; any other value is used verbatim.
/// A missing variable resolves to an empty key: the affected fetcher then degrades
/// to its no-data/fallback path instead of failing startup.
pub(crate) fn resolve_secret(raw: &str, env_var: &str) -> String {
    if !raw.trim().eq_ignore_ascii_case("env") {
        return raw.trim().to_string();
    }
    match std::env::var(env_var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => {
            warn!(target: "config", env_var, "secret not set; dependent fetcher will return no data");
            String::new()
        }
    }
}
