//! Request builders — one per provider, each producing a `ProviderRequest`.
//!
//! Bodies are assembled with `serde_json::json!` so user-supplied text is
//! always escaped by the serializer, whatever quotes or backslashes it holds.

use reqwest::Url;
use serde_json::{json, Value};

use cotask_core::config::RequestConfig;
use cotask_core::types::{Message, ProviderTag, QueryContext};

/// Appended to every single-message prompt.
pub const FORMAT_INSTRUCTION: &str =
    "Make sure responses are presented in well paragraphy format.";

/// Value of the `anthropic-version` header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Signature shared by every request builder.
pub type Builder = fn(&BuildInput<'_>) -> ProviderRequest;

// ─────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────

/// Sampling parameters sent to providers that accept them.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParams {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

impl From<&RequestConfig> for GenerationParams {
    fn from(config: &RequestConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Everything a builder needs for one call.
#[derive(Clone, Copy)]
pub struct BuildInput<'a> {
    /// API base URL, without a trailing path (e.g. `"https://api.openai.com/v1"`).
    pub api_base: &'a str,
    pub credential: &'a str,
    pub model: &'a str,
    pub query: &'a QueryContext,
    pub params: &'a GenerationParams,
}

impl BuildInput<'_> {
    /// Join the API base with an endpoint path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }
}

// ─────────────────────────────────────────────
// ProviderRequest
// ─────────────────────────────────────────────

/// A fully built wire request: POST `url` with `headers`, `query_params`, and a JSON `body`.
#[derive(Clone, PartialEq)]
pub struct ProviderRequest {
    pub provider: ProviderTag,
    pub url: String,
    /// Auth and versioning headers. `Content-Type` is added by the transport.
    pub headers: Vec<(String, String)>,
    /// URL query parameters (Gemini carries its key here).
    pub query_params: Vec<(String, String)>,
    pub body: Value,
}

impl ProviderRequest {
    fn new(provider: ProviderTag, url: String, body: Value) -> Self {
        ProviderRequest {
            provider,
            url,
            headers: Vec::new(),
            query_params: Vec::new(),
            body,
        }
    }

    fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    fn with_bearer(self, credential: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {credential}"))
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Query parameter lookup.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The serialized JSON body.
    pub fn body_string(&self) -> String {
        self.body.to_string()
    }
}

const SECRET_HEADERS: &[&str] = &["authorization", "x-api-key"];
const SECRET_PARAMS: &[&str] = &["key"];

impl std::fmt::Debug for ProviderRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                let secret = SECRET_HEADERS.iter().any(|s| k.eq_ignore_ascii_case(s));
                (k.as_str(), if secret { "<redacted>" } else { v.as_str() })
            })
            .collect();
        let params: Vec<(&str, &str)> = self
            .query_params
            .iter()
            .map(|(k, v)| {
                let secret = SECRET_PARAMS.contains(&k.as_str());
                (k.as_str(), if secret { "<redacted>" } else { v.as_str() })
            })
            .collect();
        f.debug_struct("ProviderRequest")
            .field("provider", &self.provider)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("query_params", &params)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────
// Prompts
// ─────────────────────────────────────────────

/// Single-message prompt: page context, question, then the formatting instruction.
///
/// Selections skip all of that and send the query as written.
pub fn user_prompt(query: &QueryContext) -> String {
    if query.is_selection() {
        return query.query.clone();
    }
    let mut prompt = String::new();
    let context = query.page_context.trim();
    if !context.is_empty() {
        let label = if query.is_pdf() { "Document" } else { "Context" };
        prompt.push_str(&format!("{label}: {context}\n\n"));
    }
    prompt.push_str(&format!("Question: {}\n\n{}", query.query, FORMAT_INSTRUCTION));
    prompt
}

/// Perplexity's system persona, which depends on where the answer may come from.
fn perplexity_system_prompt(query: &QueryContext) -> String {
    let domain = query.domain.trim();
    if query.is_pdf() {
        "You are a precise document analyst. Answer using only the document text \
         supplied by the user. Do not search the web or rely on outside knowledge; \
         if the document does not contain the answer, say so."
            .to_string()
    } else if domain.is_empty() {
        "You are a research assistant. Search the web and answer concisely, \
         citing your sources."
            .to_string()
    } else {
        format!(
            "You are a research assistant. Search only pages on {domain} and answer \
             from what you find there, citing your sources."
        )
    }
}

fn perplexity_user_prompt(query: &QueryContext) -> String {
    if query.is_selection() {
        return query.query.clone();
    }
    let context = query.page_context.trim();
    let domain = query.domain.trim();
    if query.is_pdf() {
        return format!(
            "Document text:\n{context}\n\nQuestion: {}\n\n\
             Base your reasoning strictly on the document text above.",
            query.query
        );
    }

    let mut prompt = if domain.is_empty() {
        format!("Question: {}", query.query)
    } else {
        format!("Search {domain} to answer the following question.\n\nQuestion: {}", query.query)
    };
    if !context.is_empty() {
        prompt.push_str(&format!("\n\nPage context:\n{context}"));
    }
    prompt
}

// ─────────────────────────────────────────────
// Builders
// ─────────────────────────────────────────────

/// OpenAI chat completions: Bearer auth, one user message.
pub fn build_openai(input: &BuildInput<'_>) -> ProviderRequest {
    let body = json!({
        "model": input.model,
        "messages": [Message::user(user_prompt(input.query))],
    });
    ProviderRequest::new(ProviderTag::OpenAi, input.endpoint("/chat/completions"), body)
        .with_bearer(input.credential)
}

/// Gemini `generateContent`: model in the URL, key as `?key=`, no auth headers.
pub fn build_gemini(input: &BuildInput<'_>) -> ProviderRequest {
    let body = json!({
        "contents": [{
            "parts": [{ "text": user_prompt(input.query) }]
        }]
    });
    let url = gemini_endpoint(input.api_base, input.model.trim());
    let mut request = ProviderRequest::new(ProviderTag::Gemini, url, body);
    request
        .query_params
        .push(("key".to_string(), input.credential.to_string()));
    request
}

/// `{api_base}/models/{model}:generateContent`, with the model percent-encoded
/// as a single path segment.
fn gemini_endpoint(api_base: &str, model: &str) -> String {
    let action = format!("{model}:generateContent");
    let base = api_base.trim_end_matches('/');
    let Ok(mut url) = Url::parse(base) else {
        // Unparseable bases fail later in the transport.
        return format!("{base}/models/{action}");
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("models").push(&action);
    }
    url.to_string()
}

/// Anthropic messages: `x-api-key` + version header, `max_tokens` required.
pub fn build_anthropic(input: &BuildInput<'_>) -> ProviderRequest {
    let body = json!({
        "model": input.model,
        "max_tokens": input.params.max_tokens,
        "messages": [Message::user(user_prompt(input.query))],
    });
    ProviderRequest::new(ProviderTag::Anthropic, input.endpoint("/messages"), body)
        .with_header("x-api-key", input.credential)
        .with_header("anthropic-version", ANTHROPIC_VERSION)
}

/// DeepSeek chat completions with sampling parameters.
pub fn build_deepseek(input: &BuildInput<'_>) -> ProviderRequest {
    sampled_chat_completion(ProviderTag::DeepSeek, input)
}

/// xAI chat completions with sampling parameters.
pub fn build_xai(input: &BuildInput<'_>) -> ProviderRequest {
    sampled_chat_completion(ProviderTag::XAi, input)
}

fn sampled_chat_completion(provider: ProviderTag, input: &BuildInput<'_>) -> ProviderRequest {
    let body = json!({
        "model": input.model,
        "messages": [Message::user(user_prompt(input.query))],
        "temperature": input.params.temperature,
        "max_tokens": input.params.max_tokens,
    });
    ProviderRequest::new(provider, input.endpoint("/chat/completions"), body)
        .with_bearer(input.credential)
}

/// Perplexity: system + user messages, domain-filtered search for web pages.
pub fn build_perplexity(input: &BuildInput<'_>) -> ProviderRequest {
    let query = input.query;
    let mut body = json!({
        "model": input.model,
        "messages": [
            Message::system(perplexity_system_prompt(query)),
            Message::user(perplexity_user_prompt(query)),
        ],
        "temperature": input.params.temperature,
    });

    let domain = query.domain.trim();
    if !query.is_pdf() && !domain.is_empty() {
        body["search_domain_filter"] = json!([domain]);
    }

    ProviderRequest::new(ProviderTag::Perplexity, input.endpoint("/chat/completions"), body)
        .with_bearer(input.credential)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
