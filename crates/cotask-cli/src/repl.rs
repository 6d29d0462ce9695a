//! Interactive REPL — repeated questions over one page context.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Each question is an independent dispatch; nothing is carried between turns.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use cotask_core::types::QueryContext;
use cotask_providers::Dispatcher;

use crate::helpers::{self, CtrlCGuard};

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Prefix that switches the model for the rest of the session (`/model grok-2`).
const MODEL_COMMAND: &str = "/model";

/// Run the interactive REPL loop.
///
/// `template` carries the page context, type, and domain; each line becomes its query.
pub async fn run(dispatcher: Dispatcher, template: QueryContext, show_logs: bool) -> Result<()> {
    let mut model = dispatcher.model().to_string();
    helpers::print_banner(&model);

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            println!("\nGoodbye!");
            break;
        }

        let _ = editor.add_history_entry(&input);

        if let Some(next) = parse_model_command(trimmed) {
            match dispatcher.resolve(next) {
                Ok(provider) => {
                    model = next.to_string();
                    println!("Model set to {model} ({provider})\n");
                }
                Err(e) => helpers::print_error(&e),
            }
            continue;
        }

        let query = QueryContext {
            query: trimmed.to_string(),
            ..template.clone()
        };

        debug!(model = %model, input = trimmed, "processing input");
        if !show_logs {
            helpers::print_thinking();
        }

        let guard = CtrlCGuard::new();
        let result = dispatcher.get_answer(&model, &query, guard.token()).await;
        drop(guard);

        if !show_logs {
            helpers::clear_thinking();
        }
        match result {
            Ok(answer) => helpers::print_response(&answer),
            // Cancelled requests land here too and return to the prompt.
            Err(e) => helpers::print_error(&e),
        }
    }

    save_history(&mut editor);

    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    cotask_core::utils::get_history_path().join("cli_history")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

/// `/model NAME` → `Some("NAME")`.
fn parse_model_command(input: &str) -> Option<&str> {
    let rest = input.strip_prefix(MODEL_COMMAND)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.trim();
    (!name.is_empty()).then_some(name)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("QUIT"));
        assert!(is_exit_command(":q"));
        assert!(!is_exit_command("what is this page about"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn model_command() {
        assert_eq!(parse_model_command("/model grok-2"), Some("grok-2"));
        assert_eq!(parse_model_command("/model   sonar-pro  "), Some("sonar-pro"));
        assert_eq!(parse_model_command("/model"), None);
        assert_eq!(parse_model_command("/modelx"), None);
        assert_eq!(parse_model_command("what model is this"), None);
    }

    #[test]
    fn history_path_under_data_dir() {
        let path = history_path();
        assert!(path.to_string_lossy().contains(".cotask"));
        assert!(path.ends_with("history/cli_history"));
    }
}
