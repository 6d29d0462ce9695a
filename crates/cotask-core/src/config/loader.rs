//! Config loader — reads `~/.cotask/config.json`, merges env vars, and
//! applies legacy migrations.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.cotask/config.json`
//! 3. Environment variables `COTASK_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;
use crate::types::ProviderTag;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let mut raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    migrate_config(&mut raw);

    let config: Config = match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to deserialize config: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply legacy config migrations.
///
/// Moves a top-level `apiKey` (single-provider layout) → `providers.openai.apiKey`.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(obj) = raw.as_object_mut() else {
        return;
    };
    let Some(legacy) = obj.remove("apiKey") else {
        return;
    };
    let Some(key) = legacy.as_str().filter(|k| !k.is_empty()) else {
        return;
    };

    let providers = obj
        .entry("providers")
        .or_insert_with(|| serde_json::json!({}));
    let Some(providers) = providers.as_object_mut() else {
        return;
    };
    let openai = providers
        .entry("openai")
        .or_insert_with(|| serde_json::json!({}));

    let already_set = openai
        .get("apiKey")
        .and_then(|v| v.as_str())
        .is_some_and(|v| !v.is_empty());
    if !already_set {
        if let Some(openai) = openai.as_object_mut() {
            openai.insert("apiKey".to_string(), serde_json::json!(key));
            debug!("Migrated apiKey → providers.openai.apiKey");
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `COTASK_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `COTASK_SETTINGS__MODEL` → `settings.model`
/// - `COTASK_PROVIDERS__<NAME>__API_KEY` → `providers.<name>.api_key`
/// - `COTASK_PROVIDERS__<NAME>__API_BASE` → `providers.<name>.api_base`
/// - `COTASK_REQUEST__TIMEOUT_SECS` → `request.timeout_secs`
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Env var name for one provider field, e.g. `COTASK_PROVIDERS__GEMINI__API_KEY`.
pub fn provider_env_var(tag: ProviderTag, field: &str) -> String {
    format!("COTASK_PROVIDERS__{}__{field}", tag.name().to_uppercase())
}

/// Apply overrides from any `key → value` source.
fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(val) = var("COTASK_SETTINGS__MODEL") {
        config.settings.model = val;
    }

    for tag in ProviderTag::ALL {
        let provider = config.providers.get_mut(tag);
        if let Some(val) = var(&provider_env_var(tag, "API_KEY")) {
            provider.api_key = val;
        }
        if let Some(val) = var(&provider_env_var(tag, "API_BASE")) {
            provider.api_base = Some(val);
        }
    }

    if let Some(val) = var("COTASK_REQUEST__TIMEOUT_SECS") {
        match val.parse::<u64>() {
            Ok(secs) => config.request.timeout_secs = secs,
            Err(_) => warn!("Ignoring invalid COTASK_REQUEST__TIMEOUT_SECS={}", val),
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
