//! `cotask status` — show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use cotask_core::config::{get_config_path, load_config, Config, ModelFallback};
use cotask_core::ProviderTag;
use cotask_providers::registry::{match_prefix, PROVIDERS};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "CoTask Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    println!("  {:<18} {}", "Model:".bold(), config.settings.model);
    println!("  {:<18} {}", "Provider:".bold(), routing_summary(&config));
    println!(
        "  {:<18} {} | {} | {}",
        "Parameters:".bold(),
        format!("temp: {}", config.request.temperature).dimmed(),
        format!("max_tokens: {}", config.request.max_tokens).dimmed(),
        format!("timeout: {}s", config.request.timeout_secs).dimmed(),
    );

    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let provider = config.providers.get(spec.tag);
        let key_status = if provider.is_configured() {
            format!("{} (key set)", "✓".green())
        } else {
            format!("{}", "· not configured".dimmed())
        };
        let base = provider
            .api_base
            .as_deref()
            .map(|b| format!("  {}", format!("via {b}").dimmed()))
            .unwrap_or_default();
        println!("    {:<20} {}{}", spec.tag.display_name(), key_status, base);
    }

    println!();

    Ok(())
}

/// Which provider the settings model routes to, and whether it can be called.
fn routing_summary(config: &Config) -> String {
    let model = &config.settings.model;
    match (match_prefix(model), config.settings.model_fallback) {
        (Some(tag), _) => with_key_marker(config, tag.display_name(), tag),
        (None, ModelFallback::OpenAi) => with_key_marker(
            config,
            "OpenAI (fallback for unknown prefix)",
            ProviderTag::OpenAi,
        ),
        (None, ModelFallback::Reject) => "none (unknown prefix, rejected)".red().to_string(),
    }
}

fn with_key_marker(config: &Config, label: &str, tag: ProviderTag) -> String {
    if config.providers.get(tag).is_configured() {
        label.to_string()
    } else {
        format!("{label} {}", "(no API key)".yellow())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_known_prefix_with_key() {
        colored::control::set_override(false);
        let mut config = Config::default();
        config.settings.model = "claude-3-haiku".into();
        config.providers.anthropic.api_key = "ant".into();
        assert_eq!(routing_summary(&config), "Anthropic");
    }

    #[test]
    fn routing_missing_key() {
        colored::control::set_override(false);
        let mut config = Config::default();
        config.settings.model = "grok-2".into();
        assert_eq!(routing_summary(&config), "xAI (no API key)");
    }

    #[test]
    fn routing_unknown_prefix() {
        colored::control::set_override(false);
        let mut config = Config::default();
        config.settings.model = "llama-3".into();
        config.providers.openai.api_key = "sk".into();
        assert_eq!(routing_summary(&config), "OpenAI (fallback for unknown prefix)");

        config.settings.model_fallback = ModelFallback::Reject;
        assert_eq!(routing_summary(&config), "none (unknown prefix, rejected)");
    }
}
