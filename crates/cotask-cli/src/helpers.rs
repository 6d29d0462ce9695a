//! Shared CLI helpers — context loading, answer/error printing, Ctrl-C cancellation.

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use cotask_core::types::{ContextType, QueryContext};
use cotask_core::utils::expand_home;
use cotask_providers::{find_by_tag, DispatchError};

// ─────────────────────────────────────────────
// Query construction
// ─────────────────────────────────────────────

/// Page context from `--context` text or a `--context-file` path (empty if neither).
pub fn read_page_context(text: Option<String>, file: Option<&str>) -> Result<String> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => {
            let path = expand_home(path);
            std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read context file: {}", path.display()))
        }
        (None, None) => Ok(String::new()),
    }
}

/// Build a `QueryContext` from the shared CLI flags.
pub fn build_query(
    query: &str,
    page_context: &str,
    pdf: bool,
    domain: Option<&str>,
) -> QueryContext {
    let context_type = if pdf {
        ContextType::Pdf
    } else {
        ContextType::Generic
    };
    let mut ctx = QueryContext::new(query, page_context).with_context_type(context_type);
    if let Some(domain) = domain {
        ctx = ctx.with_domain(domain_of(domain));
    }
    ctx
}

/// Host part of a URL-ish string (`https://docs.rs/foo` → `docs.rs`).
pub fn domain_of(input: &str) -> &str {
    let rest = input
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(input);
    rest.split(['/', '?', '#']).next().unwrap_or(rest)
}

// ─────────────────────────────────────────────
// Ctrl-C → cancellation
// ─────────────────────────────────────────────

/// Cancels its token on Ctrl-C while alive. Dropping it stops listening.
pub struct CtrlCGuard {
    token: CancellationToken,
    watcher: JoinHandle<()>,
}

impl CtrlCGuard {
    pub fn new() -> Self {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                trigger.cancel();
            }
        });
        CtrlCGuard { token, watcher }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for CtrlCGuard {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

// ─────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────

/// Print an answer to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "CoTask".cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print a dispatch failure to stderr.
pub fn print_error(err: &DispatchError) {
    match err {
        DispatchError::Cancelled { .. } => eprintln!("\n{}\n", "Cancelled.".yellow()),
        DispatchError::MissingCredential { provider } => {
            eprintln!("\n{} {err}", "Error:".red().bold());
            eprintln!(
                "{}\n",
                format!(
                    "Set providers.{}.apiKey in {} or {}.",
                    provider.name(),
                    cotask_core::config::get_config_path().display(),
                    find_by_tag(*provider).env_key
                )
                .dimmed()
            );
        }
        _ => eprintln!("\n{} {err}\n", "Error:".red().bold()),
    }
}

/// Print the banner shown at REPL start.
pub fn print_banner(model: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "CoTask".cyan().bold(), version.dimmed());
    println!("{}", format!("Model: {model}").dimmed());
    println!("{}", "Ask a question, or \"exit\" to quit.".dimmed());
    println!();
}

/// Print a "thinking" placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking... (Ctrl-C to cancel)".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_context_prefers_inline_text() {
        let ctx = read_page_context(Some("inline".into()), Some("/nonexistent")).unwrap();
        assert_eq!(ctx, "inline");
    }

    #[test]
    fn read_context_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.txt");
        std::fs::write(&path, "This page describes widget pricing.").unwrap();

        let ctx = read_page_context(None, Some(path.to_str().unwrap())).unwrap();
        assert_eq!(ctx, "This page describes widget pricing.");
    }

    #[test]
    fn read_context_missing_file() {
        let err = read_page_context(None, Some("/nonexistent/page.txt")).unwrap_err();
        assert!(err.to_string().contains("page.txt"));
    }

    #[test]
    fn read_context_none() {
        assert_eq!(read_page_context(None, None).unwrap(), "");
    }

    #[test]
    fn build_query_flags() {
        let q = build_query("What?", "ctx", true, Some("https://docs.rs/serde"));
        assert!(q.is_pdf());
        assert_eq!(q.domain, "docs.rs");

        let q = build_query("What?", "", false, None);
        assert_eq!(q.context_type, ContextType::Generic);
        assert!(q.domain.is_empty());
    }

    #[test]
    fn domain_of_urls() {
        assert_eq!(domain_of("https://docs.rs/tokio/latest"), "docs.rs");
        assert_eq!(domain_of("example.com/page?x=1"), "example.com");
        assert_eq!(domain_of("example.com"), "example.com");
    }
}
