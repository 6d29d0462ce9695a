//! Response normalizers — pull the answer text out of each provider's response shape.
//!
//! Every path is checked before it is read; a missing or non-string field
//! becomes a `ShapeError` naming the path that was expected.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Signature shared by every response normalizer.
pub type Normalizer = fn(&Value) -> Result<String, ShapeError>;

/// Non-greedy, spans newlines. An unterminated `<think>` never matches.
static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid think-block regex"));

/// A successful response did not have the expected shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeError {
    /// The JSON path that was missing or not a string (e.g. `choices[0].message.content`).
    pub path: &'static str,
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "missing or non-string `{}`", self.path)
    }
}

impl std::error::Error for ShapeError {}

/// Read a string at a JSON pointer, reporting `path` when it is absent.
fn text_at<'a>(body: &'a Value, pointer: &str, path: &'static str) -> Result<&'a str, ShapeError> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .ok_or(ShapeError { path })
}

// ─────────────────────────────────────────────
// Normalizers
// ─────────────────────────────────────────────

/// OpenAI, DeepSeek, xAI: `choices[0].message.content`.
pub fn parse_chat_completion(body: &Value) -> Result<String, ShapeError> {
    text_at(body, "/choices/0/message/content", "choices[0].message.content").map(String::from)
}

/// Gemini: `candidates[0].content.parts[0].text`.
pub fn parse_gemini(body: &Value) -> Result<String, ShapeError> {
    text_at(
        body,
        "/candidates/0/content/parts/0/text",
        "candidates[0].content.parts[0].text",
    )
    .map(String::from)
}

/// Anthropic: the first text block in `content[]`.
///
/// Blocks without a `type` are treated as text, so a bare `content[0].text` also works.
pub fn parse_anthropic(body: &Value) -> Result<String, ShapeError> {
    const PATH: &str = "content[0].text";
    body.get("content")
        .and_then(Value::as_array)
        .and_then(|blocks| {
            blocks.iter().find_map(|block| {
                let is_text = block
                    .get("type")
                    .map_or(true, |t| t.as_str() == Some("text"));
                if is_text {
                    block.get("text").and_then(Value::as_str)
                } else {
                    None
                }
            })
        })
        .map(String::from)
        .ok_or(ShapeError { path: PATH })
}

/// Perplexity: chat completion content with `<think>` blocks removed and
/// a numbered references list appended from `citations[]`.
pub fn parse_perplexity(body: &Value) -> Result<String, ShapeError> {
    let content = text_at(body, "/choices/0/message/content", "choices[0].message.content")?;
    let mut answer = strip_think_blocks(content);

    let citations: Vec<&str> = body
        .get("citations")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    if !citations.is_empty() {
        answer.push_str(&format_references(&citations));
    }

    Ok(answer)
}

/// Remove every `<think>...</think>` block and trim the remainder.
pub fn strip_think_blocks(text: &str) -> String {
    THINK_BLOCK.replace_all(text, "").trim().to_string()
}

/// Markdown references block: one numbered link per citation URL.
fn format_references(citations: &[&str]) -> String {
    let mut block = String::from("\n\n**References:**");
    for (i, url) in citations.iter().enumerate() {
        block.push_str(&format!("\n{}. [{url}]({url})", i + 1));
    }
    block
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
