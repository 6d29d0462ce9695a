//! Dispatcher — resolves the provider for a model, builds and sends the
//! request, and normalizes the response into a single answer string.
//!
//! A `Dispatcher` holds no mutable state; share it behind an `Arc` and call
//! it from as many tasks as you like. Each call owns its request and response.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use cotask_core::config::{Config, ModelFallback};
use cotask_core::types::{ContextType, ProviderTag, QueryContext};
use cotask_core::utils::truncate_string;

use crate::error::{AnswerResult, DispatchError};
use crate::registry::{find_by_tag, match_prefix};
use crate::request::{BuildInput, GenerationParams};
use crate::traits::{CredentialStore, RawResponse, Transport};
use crate::transport::ReqwestTransport;

/// Longest raw error body quoted back to the user.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Prefix for the right-click "analyze selection" flow.
const ANALYZE_PREFIX: &str = "Analyze this text: ";

// ─────────────────────────────────────────────
// DispatcherConfig
// ─────────────────────────────────────────────

/// Everything the dispatcher reads from settings, fixed at construction.
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// Model used by `answer` and `analyze_selection`.
    pub model: String,
    pub model_fallback: ModelFallback,
    pub params: GenerationParams,
    /// Per-provider API base overrides (proxies, mock servers).
    pub api_bases: HashMap<ProviderTag, String>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            model_fallback: ModelFallback::default(),
            params: GenerationParams::default(),
            api_bases: HashMap::new(),
        }
    }
}

impl From<&Config> for DispatcherConfig {
    fn from(config: &Config) -> Self {
        let api_bases = ProviderTag::ALL
            .into_iter()
            .filter_map(|tag| {
                config
                    .providers
                    .get(tag)
                    .api_base
                    .clone()
                    .filter(|base| !base.trim().is_empty())
                    .map(|base| (tag, base))
            })
            .collect();

        Self {
            model: config.settings.model.clone(),
            model_fallback: config.settings.model_fallback,
            params: GenerationParams::from(&config.request),
            api_bases,
        }
    }
}

// ─────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────

pub struct Dispatcher {
    config: DispatcherConfig,
    credentials: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(
        config: DispatcherConfig,
        credentials: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Dispatcher {
            config,
            credentials,
            transport,
        }
    }

    /// Wire a dispatcher from a loaded config: its provider keys as the
    /// credential store and a reqwest transport with the configured timeout.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let transport =
            ReqwestTransport::new(Duration::from_secs(config.request.timeout_secs))?;
        Ok(Dispatcher::new(
            DispatcherConfig::from(config),
            Arc::new(config.providers.clone()),
            Arc::new(transport),
        ))
    }

    /// The configured settings model.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Resolve a model to its provider, applying the fallback policy.
    pub fn resolve(&self, model: &str) -> Result<ProviderTag, DispatchError> {
        if let Some(tag) = match_prefix(model) {
            return Ok(tag);
        }
        match self.config.model_fallback {
            ModelFallback::OpenAi => {
                warn!(model, "Unrecognized model prefix, routing to OpenAI");
                Ok(ProviderTag::OpenAi)
            }
            ModelFallback::Reject => Err(DispatchError::UnknownProvider {
                model: model.to_string(),
            }),
        }
    }

    /// Answer a query with the configured settings model.
    pub async fn answer(&self, query: &QueryContext, cancel: &CancellationToken) -> AnswerResult {
        self.get_answer(&self.config.model, query, cancel).await
    }

    /// Ask the settings model to analyze a piece of selected text.
    pub async fn analyze_selection(
        &self,
        selected_text: &str,
        cancel: &CancellationToken,
    ) -> AnswerResult {
        let query = QueryContext::new(format!("{ANALYZE_PREFIX}{selected_text}"), "")
            .with_context_type(ContextType::Selection);
        self.answer(&query, cancel).await
    }

    /// Answer a query with a specific model.
    ///
    /// Resolves the provider, looks up its key, builds the request, sends it
    /// once, and normalizes the response. Nothing is retried.
    pub async fn get_answer(
        &self,
        model: &str,
        query: &QueryContext,
        cancel: &CancellationToken,
    ) -> AnswerResult {
        let provider = self.resolve(model)?;
        let spec = find_by_tag(provider);

        let credential = self
            .credentials
            .lookup(provider)
            .filter(|key| !key.trim().is_empty())
            .ok_or(DispatchError::MissingCredential { provider })?;

        let api_base = self
            .config
            .api_bases
            .get(&provider)
            .map(String::as_str)
            .unwrap_or(spec.default_api_base);

        let request = (spec.build)(&BuildInput {
            api_base,
            credential: &credential,
            model: model.trim(),
            query,
            params: &self.config.params,
        });

        debug!(
            provider = provider.display_name(),
            model,
            context_chars = query.page_context.chars().count(),
            "Calling LLM"
        );

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(provider = provider.display_name(), "Request cancelled");
                return Err(DispatchError::Cancelled { provider });
            }
            result = self.transport.send(&request) => result.map_err(|e| {
                error!(provider = provider.display_name(), error = %format!("{e:#}"), "HTTP request failed");
                DispatchError::TransportError {
                    provider,
                    detail: format!("{e:#}"),
                }
            })?,
        };

        if !response.is_success() {
            let message = error_message(&response);
            error!(
                provider = provider.display_name(),
                status = response.status,
                message = %message,
                "API error"
            );
            return Err(DispatchError::ProviderRejected {
                provider,
                status: response.status,
                message,
            });
        }

        let body: Value = serde_json::from_str(&response.body).map_err(|e| {
            error!(provider = provider.display_name(), error = %e, "Response is not JSON");
            DispatchError::TransportError {
                provider,
                detail: format!("invalid JSON in response: {e}"),
            }
        })?;

        let answer = (spec.parse)(&body).map_err(|e| {
            error!(provider = provider.display_name(), error = %e, "Failed to parse LLM response");
            DispatchError::MalformedResponse {
                provider,
                detail: e.to_string(),
                body: response.body.clone(),
            }
        })?;

        debug!(
            provider = provider.display_name(),
            answer_chars = answer.len(),
            "LLM response received"
        );
        Ok(answer)
    }
}

/// Pull a human-readable message out of an error response.
///
/// Tries `error.message`, a string `error`, and a top-level `message`, then
/// falls back to the (truncated) raw body or the status line. Blank strings
/// never count as a message.
fn error_message(response: &RawResponse) -> String {
    if let Ok(body) = serde_json::from_str::<Value>(&response.body) {
        let message = non_blank(body.pointer("/error/message"))
            .or_else(|| non_blank(body.get("error")))
            .or_else(|| non_blank(body.get("message")));
        if let Some(message) = message {
            return message.to_string();
        }
    }

    let raw = response.body.trim();
    if raw.is_empty() {
        status_line(response.status)
    } else {
        truncate_string(raw, MAX_ERROR_BODY_CHARS)
    }
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// `HTTP 503 Service Unavailable`, or just `HTTP 599` for unregistered codes.
fn status_line(status: u16) -> String {
    match StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
    {
        Some(reason) => format!("HTTP {status} {reason}"),
        None => format!("HTTP {status}"),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
