//! Configuration management for the mashup service
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use mashup::config::Config;
//!
//! let config = Config::load(None).expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `MASHUP__<section>__<key>`
//!
//! Examples:
//! - `MASHUP__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `MASHUP__SOURCES__FETCH_CONCURRENCY=4`
//! - `MASHUP__AUDIO__ENGINE=wav`
//!
//! Two values are required and only ever read from the plain environment:
//! `FROM_EMAIL` (sender address) and `SENDGRID_API_KEY` (delivery credential).
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/mashup.toml`.
//! This can be overridden using the `MASHUP_CONFIG` environment variable
//! or the `--config` flag.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{
    AudioConfig, AudioEngineKind, Config, FormLimits, MailConfig, ServerConfig,
    SourcesConfig, StorageConfig,
};
pub use validation::{MIN_OVERSAMPLE, ValidationError};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Required environment variable {0} is not set")]
    MissingCredential(&'static str),
}

/// Sender identity and API key for the delivery service
#[derive(Clone)]
pub struct Credentials {
    pub sender: String,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("sender", &self.sender)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`MASHUP__*`)
    /// 2. TOML file (`path`, `MASHUP_CONFIG`, or `config/mashup.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails
    /// - `FROM_EMAIL` or `SENDGRID_API_KEY` is missing
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        config.credentials()?;
        Ok(config)
    }

    /// Load configuration from a specific path, without reading secrets
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Delivery credentials, failing if either environment value was absent
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let sender = non_empty(&self.mail.sender)
            .ok_or(ConfigError::MissingCredential(sources::SENDER_ENV_VAR))?;
        let api_key = non_empty(&self.mail.api_key)
            .ok_or(ConfigError::MissingCredential(sources::API_KEY_ENV_VAR))?;

        Ok(Credentials { sender, api_key })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
