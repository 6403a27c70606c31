//! Core types and configuration for murmur.
//!
//! This crate provides the configuration model shared by the murmur binary
//! and its API clients.

mod config;

pub use config::{Config, ConfigManager};

/// Application name
pub const APP_NAME: &str = "murmur";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable consulted for the API credential before the config file.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
