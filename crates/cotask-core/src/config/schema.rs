//! Configuration schema.
//!
//! Hierarchy: `Config` → `Settings`, `ProvidersConfig`, `RequestConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

use crate::types::ProviderTag;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.cotask/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub settings: Settings,
    pub providers: ProvidersConfig,
    pub request: RequestConfig,
}

// ─────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────

/// User-facing settings. Only `model` drives dispatch.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Selected model identifier (e.g. `"gpt-4o"`, `"claude-3-opus"`).
    pub model: String,
    /// What to do when the model prefix matches no provider.
    pub model_fallback: ModelFallback,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            model_fallback: ModelFallback::OpenAi,
        }
    }
}

/// Policy for model identifiers with an unrecognized prefix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFallback {
    /// Route to OpenAI (logged as a warning).
    #[default]
    OpenAi,
    /// Refuse the request with an unknown-provider error.
    Reject,
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Credentials and endpoint override for a single LLM provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// All provider configurations, one per `ProviderTag`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub gemini: ProviderConfig,
    #[serde(default)]
    pub anthropic: ProviderConfig,
    #[serde(default)]
    pub deepseek: ProviderConfig,
    #[serde(default)]
    pub xai: ProviderConfig,
    #[serde(default)]
    pub perplexity: ProviderConfig,
}

impl ProvidersConfig {
    /// Get the config for a provider.
    pub fn get(&self, tag: ProviderTag) -> &ProviderConfig {
        match tag {
            ProviderTag::OpenAi => &self.openai,
            ProviderTag::Gemini => &self.gemini,
            ProviderTag::Anthropic => &self.anthropic,
            ProviderTag::DeepSeek => &self.deepseek,
            ProviderTag::XAi => &self.xai,
            ProviderTag::Perplexity => &self.perplexity,
        }
    }

    /// Mutable access, used by env overrides and migrations.
    pub fn get_mut(&mut self, tag: ProviderTag) -> &mut ProviderConfig {
        match tag {
            ProviderTag::OpenAi => &mut self.openai,
            ProviderTag::Gemini => &mut self.gemini,
            ProviderTag::Anthropic => &mut self.anthropic,
            ProviderTag::DeepSeek => &mut self.deepseek,
            ProviderTag::XAi => &mut self.xai,
            ProviderTag::Perplexity => &mut self.perplexity,
        }
    }

    /// The API key for a provider, if one is set.
    pub fn api_key(&self, tag: ProviderTag) -> Option<&str> {
        let config = self.get(tag);
        config.is_configured().then_some(config.api_key.trim())
    }
}

// ─────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────

/// Network and generation parameters applied to every provider call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestConfig {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum tokens to generate (required by Anthropic, sent to DeepSeek and xAI).
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.settings.model, "gpt-3.5-turbo");
        assert_eq!(config.settings.model_fallback, ModelFallback::OpenAi);
        assert_eq!(config.request.timeout_secs, 60);
        assert_eq!(config.request.max_tokens, 1024);
        assert_eq!(config.request.temperature, 0.7);
    }

    #[test]
    fn test_config_from_json_camel_case() {
        let json = serde_json::json!({
            "settings": {
                "model": "claude-3-opus",
                "modelFallback": "reject"
            },
            "request": {
                "timeoutSecs": 15,
                "maxTokens": 2048
            }
        });

        let config: Config = serde_json::from_value(json).unwrap();
        assert_eq!(config.settings.model, "claude-3-opus");
        assert_eq!(config.settings.model_fallback, ModelFallback::Reject);
        assert_eq!(config.request.timeout_secs, 15);
        assert_eq!(config.request.max_tokens, 2048);
        // Defaults preserved for missing fields
        assert_eq!(config.request.temperature, 0.7);
    }

    #[test]
    fn test_config_json_uses_camel_case() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json["request"].get("timeoutSecs").is_some());
        assert!(json["settings"].get("modelFallback").is_some());
        assert_eq!(json["settings"]["modelFallback"], "openai");
        assert!(json["request"].get("timeout_secs").is_none());
    }

    #[test]
    fn test_provider_config_is_configured() {
        assert!(!ProviderConfig::default().is_configured());

        let blank = ProviderConfig {
            api_key: "   ".to_string(),
            ..Default::default()
        };
        assert!(!blank.is_configured());

        let with_key = ProviderConfig {
            api_key: "sk-123".to_string(),
            ..Default::default()
        };
        assert!(with_key.is_configured());
    }

    #[test]
    fn test_providers_lookup() {
        let mut providers = ProvidersConfig::default();
        providers.xai.api_key = "xai-123".to_string();

        assert_eq!(providers.api_key(ProviderTag::XAi), Some("xai-123"));
        assert_eq!(providers.api_key(ProviderTag::OpenAi), None);
        assert!(providers.get(ProviderTag::XAi).is_configured());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = serde_json::json!({
            "providers": {
                "perplexity": {
                    "apiKey": "pplx-test",
                    "apiBase": "http://localhost:9000"
                }
            }
        });

        let config: Config = serde_json::from_value(json).unwrap();
        assert_eq!(config.providers.perplexity.api_key, "pplx-test");
        assert_eq!(
            config.providers.perplexity.api_base.as_deref(),
            Some("http://localhost:9000")
        );
        assert!(!config.providers.openai.is_configured());
        assert_eq!(config.settings.model, "gpt-3.5-turbo");
    }
}
