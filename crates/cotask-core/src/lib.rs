//! Core types, configuration, and utilities shared by the CoTask crates.

pub mod config;
pub mod types;
pub mod utils;

pub use types::{ContextType, Message, ProviderTag, QueryContext};
