//! `cotask onboard` — write a default configuration.
//!
//! Creates `~/.cotask/config.json` (if absent) and the history directory.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use cotask_core::config::{get_config_path, save_config, Config};
use cotask_core::utils::get_history_path;

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "CoTask — Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if write_default_config(&config_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    let history_dir = get_history_path();
    std::fs::create_dir_all(&history_dir)
        .with_context(|| format!("failed to create {}", history_dir.display()))?;
    println!("  {} history dir at {}", "✓".green(), history_dir.display());

    println!();
    println!("  Next: add an API key under {} in the config,", "providers".bold());
    println!("  then run {}.", "cotask ask \"...\" --context-file page.txt".bold());
    println!();

    Ok(())
}

/// Write `Config::default()` to `path` unless a file is already there.
///
/// Returns `true` if a new file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write config: {}", path.display()))?;
    Ok(true)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use cotask_core::config::load_config;

    #[test]
    fn writes_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        assert!(write_default_config(&path).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"model\": \"gpt-3.5-turbo\""));
        assert!(content.contains("\"apiKey\""));

        let loaded = load_config(Some(&path));
        assert_eq!(loaded.settings.model, "gpt-3.5-turbo");
    }

    #[test]
    fn keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"settings":{"model":"grok-2"}}"#).unwrap();

        assert!(!write_default_config(&path).unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("grok-2"));
    }
}
