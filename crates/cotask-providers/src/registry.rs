//! Provider registry — static specs for the six supported LLM providers.
//!
//! Each `ProviderSpec` pairs a provider with the model prefixes that select it,
//! its default API base, and the request builder / response normalizer that
//! speak its wire format. Dispatch is a table lookup, never a branch cascade.

use cotask_core::types::ProviderTag;

use crate::normalize::{self, Normalizer};
use crate::request::{self, Builder};

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one LLM provider.
#[derive(Clone)]
pub struct ProviderSpec {
    /// Which provider this spec describes.
    pub tag: ProviderTag,
    /// Lowercase model-name prefixes that select this provider (e.g. `&["claude-"]`).
    pub model_prefixes: &'static [&'static str],
    /// API base used when the config has no override.
    pub default_api_base: &'static str,
    /// Environment variable that overrides the configured API key.
    pub env_key: &'static str,
    /// Builds the provider-specific wire request.
    pub build: Builder,
    /// Extracts the answer text from a successful response body.
    pub parse: Normalizer,
}

impl std::fmt::Debug for ProviderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSpec")
            .field("tag", &self.tag)
            .field("model_prefixes", &self.model_prefixes)
            .field("default_api_base", &self.default_api_base)
            .field("env_key", &self.env_key)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────
// All 6 providers
// ─────────────────────────────────────────────

/// Complete list of supported provider specifications, in `ProviderTag::ALL` order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        tag: ProviderTag::OpenAi,
        model_prefixes: &["gpt-", "o1-", "o3-"],
        default_api_base: "https://api.openai.com/v1",
        env_key: "COTASK_PROVIDERS__OPENAI__API_KEY",
        build: request::build_openai,
        parse: normalize::parse_chat_completion,
    },
    // Gemini passes its key as a `?key=` query parameter.
    ProviderSpec {
        tag: ProviderTag::Gemini,
        model_prefixes: &["gemini-"],
        default_api_base: "https://generativelanguage.googleapis.com/v1beta",
        env_key: "COTASK_PROVIDERS__GEMINI__API_KEY",
        build: request::build_gemini,
        parse: normalize::parse_gemini,
    },
    ProviderSpec {
        tag: ProviderTag::Anthropic,
        model_prefixes: &["claude-"],
        default_api_base: "https://api.anthropic.com/v1",
        env_key: "COTASK_PROVIDERS__ANTHROPIC__API_KEY",
        build: request::build_anthropic,
        parse: normalize::parse_anthropic,
    },
    ProviderSpec {
        tag: ProviderTag::DeepSeek,
        model_prefixes: &["deepseek-"],
        default_api_base: "https://api.deepseek.com",
        env_key: "COTASK_PROVIDERS__DEEPSEEK__API_KEY",
        build: request::build_deepseek,
        parse: normalize::parse_chat_completion,
    },
    ProviderSpec {
        tag: ProviderTag::XAi,
        model_prefixes: &["grok-"],
        default_api_base: "https://api.x.ai/v1",
        env_key: "COTASK_PROVIDERS__XAI__API_KEY",
        build: request::build_xai,
        parse: normalize::parse_chat_completion,
    },
    // Perplexity strips `<think>` blocks and appends citations.
    ProviderSpec {
        tag: ProviderTag::Perplexity,
        model_prefixes: &["sonar-"],
        default_api_base: "https://api.perplexity.ai",
        env_key: "COTASK_PROVIDERS__PERPLEXITY__API_KEY",
        build: request::build_perplexity,
        parse: normalize::parse_perplexity,
    },
];

// ─────────────────────────────────────────────
// Matching functions
// ─────────────────────────────────────────────

/// Match a model identifier to a provider by prefix, without any fallback.
///
/// Matching ignores case and surrounding whitespace.
pub fn match_prefix(model: &str) -> Option<ProviderTag> {
    let model_lower = model.trim().to_lowercase();
    PROVIDERS
        .iter()
        .find(|spec| {
            spec.model_prefixes
                .iter()
                .any(|prefix| model_lower.starts_with(prefix))
        })
        .map(|spec| spec.tag)
}

/// Resolve the provider for a model identifier.
///
/// Total: unrecognized prefixes resolve to OpenAI.
pub fn resolve_provider(model: &str) -> ProviderTag {
    match_prefix(model).unwrap_or(ProviderTag::OpenAi)
}

/// Look up the spec for a provider.
pub fn find_by_tag(tag: ProviderTag) -> &'static ProviderSpec {
    // PROVIDERS is laid out in ProviderTag::ALL order; see test_specs_follow_tag_order.
    let index = ProviderTag::ALL
        .iter()
        .position(|t| *t == tag)
        .unwrap_or_default();
    &PROVIDERS[index]
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
