//! Configuration system — schema, loading, and env var overrides.
//!
//! The config file doubles as the settings store (selected model) and the
//! credentials store (per-provider API keys) the dispatcher reads from.
//!
//! # Usage
//! ```no_run
//! use cotask_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Model: {}", cfg.settings.model);
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{get_config_path, load_config, provider_env_var, save_config};
pub use schema::{Config, ModelFallback, ProviderConfig, ProvidersConfig, RequestConfig, Settings};
