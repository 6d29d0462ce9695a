//! CoTask CLI — entry point.
//!
//! # Commands
//!
//! - `cotask ask QUERY [--context TEXT | --context-file PATH] [--pdf] [--domain HOST] [--model M]`
//! - `cotask analyze TEXT` — analyze a selected snippet with the settings model
//! - `cotask chat` — interactive REPL over one page context
//! - `cotask status` — show configuration and provider status
//! - `cotask onboard` — write a default config

mod helpers;
mod onboard;
mod repl;
mod status;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use cotask_core::config::load_config;
use cotask_providers::{AnswerResult, Dispatcher};

use crate::helpers::CtrlCGuard;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// CoTask — ask any LLM about the page you're reading
#[derive(Parser)]
#[command(name = "cotask", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Page-context flags shared by `ask` and `chat`.
#[derive(Args, Clone, Debug, Default)]
struct PageArgs {
    /// Read page context from a text file
    #[arg(long, value_name = "PATH")]
    context_file: Option<String>,

    /// Treat the context as extracted PDF text
    #[arg(long, default_value_t = false)]
    pdf: bool,

    /// Restrict web search to this site (Perplexity models)
    #[arg(long, value_name = "HOST")]
    domain: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question about a page
    Ask {
        /// The question
        query: String,

        /// Page context as inline text
        #[arg(long, conflicts_with = "context_file")]
        context: Option<String>,

        #[command(flatten)]
        page: PageArgs,

        /// Model to use instead of the configured one
        #[arg(short, long)]
        model: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Analyze a piece of selected text
    Analyze {
        /// The selected text
        text: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Chat about a page interactively
    Chat {
        #[command(flatten)]
        page: PageArgs,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Write a default configuration file
    Onboard,

    /// Show configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            query,
            context,
            page,
            model,
            logs,
        } => {
            init_logging(logs);
            run_ask(query, context, page, model).await
        }
        Commands::Analyze { text, logs } => {
            init_logging(logs);
            run_analyze(text).await
        }
        Commands::Chat { page, logs } => {
            init_logging(logs);
            run_chat(page, logs).await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

async fn run_ask(
    query: String,
    context: Option<String>,
    page: PageArgs,
    model: Option<String>,
) -> Result<()> {
    let config = load_config(None);
    let dispatcher = Dispatcher::from_config(&config)?;

    let page_context = helpers::read_page_context(context, page.context_file.as_deref())?;
    let ctx = helpers::build_query(&query, &page_context, page.pdf, page.domain.as_deref());
    let model = model.unwrap_or_else(|| dispatcher.model().to_string());

    info!(model = %model, context_chars = page_context.chars().count(), "asking");
    let guard = CtrlCGuard::new();
    finish(dispatcher.get_answer(&model, &ctx, guard.token()).await)
}

async fn run_analyze(text: String) -> Result<()> {
    let config = load_config(None);
    let dispatcher = Dispatcher::from_config(&config)?;

    let guard = CtrlCGuard::new();
    finish(dispatcher.analyze_selection(&text, guard.token()).await)
}

async fn run_chat(page: PageArgs, show_logs: bool) -> Result<()> {
    let config = load_config(None);
    let dispatcher = Dispatcher::from_config(&config)?;

    let page_context = helpers::read_page_context(None, page.context_file.as_deref())?;
    let template = helpers::build_query("", &page_context, page.pdf, page.domain.as_deref());
    repl::run(dispatcher, template, show_logs).await
}

/// Print a single-shot result; failures exit non-zero.
fn finish(result: AnswerResult) -> Result<()> {
    match result {
        Ok(answer) => {
            helpers::print_response(&answer);
            Ok(())
        }
        Err(e) => {
            helpers::print_error(&e);
            std::process::exit(1);
        }
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("cotask=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
