//! Core types for CoTask — the provider tag, query context, and chat message
//! shapes shared by the config layer and the provider layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─────────────────────────────────────────────
// Provider tag
// ─────────────────────────────────────────────

/// One of the LLM vendors CoTask can dispatch to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderTag {
    OpenAi,
    Gemini,
    Anthropic,
    DeepSeek,
    XAi,
    Perplexity,
}

impl ProviderTag {
    /// Every tag, in the order they are listed in config and status output.
    pub const ALL: [ProviderTag; 6] = [
        ProviderTag::OpenAi,
        ProviderTag::Gemini,
        ProviderTag::Anthropic,
        ProviderTag::DeepSeek,
        ProviderTag::XAi,
        ProviderTag::Perplexity,
    ];

    /// Lowercase key used in config files and env vars (e.g. `"deepseek"`).
    pub fn name(self) -> &'static str {
        match self {
            ProviderTag::OpenAi => "openai",
            ProviderTag::Gemini => "gemini",
            ProviderTag::Anthropic => "anthropic",
            ProviderTag::DeepSeek => "deepseek",
            ProviderTag::XAi => "xai",
            ProviderTag::Perplexity => "perplexity",
        }
    }

    /// Human-readable name for logs and CLI output.
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderTag::OpenAi => "OpenAI",
            ProviderTag::Gemini => "Gemini",
            ProviderTag::Anthropic => "Anthropic",
            ProviderTag::DeepSeek => "DeepSeek",
            ProviderTag::XAi => "xAI",
            ProviderTag::Perplexity => "Perplexity",
        }
    }
}

impl fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ProviderTag::ALL
            .into_iter()
            .find(|tag| tag.name() == lower)
            .ok_or_else(|| format!("unknown provider '{s}'"))
    }
}

// ─────────────────────────────────────────────
// Query context
// ─────────────────────────────────────────────

/// What kind of document the page context was extracted from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    #[default]
    Generic,
    Pdf,
    /// Selected text sent from a context menu. The query is the complete
    /// prompt and goes out verbatim.
    Selection,
}

/// A single user interaction: the question plus whatever the page gave us.
///
/// Lives for one dispatch call and is never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryContext {
    /// The user's question.
    pub query: String,
    /// Text extracted from the active page or PDF.
    pub page_context: String,
    pub context_type: ContextType,
    /// Site host, used only for domain-filtered search.
    pub domain: String,
}

impl QueryContext {
    /// A generic-page query with the given context.
    pub fn new(query: impl Into<String>, page_context: impl Into<String>) -> Self {
        QueryContext {
            query: query.into(),
            page_context: page_context.into(),
            ..Default::default()
        }
    }

    pub fn with_context_type(mut self, context_type: ContextType) -> Self {
        self.context_type = context_type;
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Whether the query carries PDF text rather than a web page.
    pub fn is_pdf(&self) -> bool {
        self.context_type == ContextType::Pdf
    }

    /// Whether the query is a ready-made prompt that needs no framing.
    pub fn is_selection(&self) -> bool {
        self.context_type == ContextType::Selection
    }
}

// ─────────────────────────────────────────────
// Chat messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A chat message in the OpenAI `messages[]` format.
///
/// Used by every chat-completions style provider and by Anthropic,
/// which accepts the same `{role, content}` shape for user turns.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
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
    fn test_provider_tag_names() {
        let names: Vec<&str> = ProviderTag::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec!["openai", "gemini", "anthropic", "deepseek", "xai", "perplexity"]
        );
    }

    #[test]
    fn test_provider_tag_from_str() {
        assert_eq!("xai".parse::<ProviderTag>().unwrap(), ProviderTag::XAi);
        assert_eq!(" DeepSeek ".parse::<ProviderTag>().unwrap(), ProviderTag::DeepSeek);
        assert!("mistral".parse::<ProviderTag>().is_err());
    }

    #[test]
    fn test_provider_tag_serde_matches_name() {
        for tag in ProviderTag::ALL {
            let json = serde_json::to_value(tag).unwrap();
            assert_eq!(json, tag.name());
        }
    }

    #[test]
    fn test_context_type_default_is_generic() {
        let ctx = QueryContext::new("q", "c");
        assert_eq!(ctx.context_type, ContextType::Generic);
        assert!(!ctx.is_pdf());
        assert!(ctx.clone().with_context_type(ContextType::Pdf).is_pdf());

        let selection = ctx.with_context_type(ContextType::Selection);
        assert!(selection.is_selection());
        assert!(!selection.is_pdf());
        assert_eq!(serde_json::to_value(ContextType::Selection).unwrap(), "selection");
    }

    #[test]
    fn test_message_serialization() {
        let sys = serde_json::to_value(Message::system("Be precise.")).unwrap();
        assert_eq!(sys["role"], "system");
        assert_eq!(sys["content"], "Be precise.");

        let user = serde_json::to_value(Message::user("He said \"hi\" \\o/")).unwrap();
        assert_eq!(user["role"], "user");
        assert_eq!(user["content"], "He said \"hi\" \\o/");
    }
}
