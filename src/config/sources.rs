use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "MASHUP_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/mashup.toml";
const ENV_PREFIX: &str = "MASHUP";
const ENV_SEPARATOR: &str = "__";

pub(crate) const SENDER_ENV_VAR: &str = "FROM_EMAIL";
pub(crate) const API_KEY_ENV_VAR: &str = "SENDGRID_API_KEY";

/// Resolve the config file path: explicit override, then `MASHUP_CONFIG`, then the default
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load(explicit_path: Option<PathBuf>) -> Result<Config, ConfigError> {
    // A missing .env is normal outside development
    let _ = dotenvy::dotenv();

    let mut config = load_from_sources(config_path(explicit_path))?;
    load_secrets(&mut config);

    Ok(config)
}

/// Secrets only ever come from the process environment
fn load_secrets(config: &mut Config) {
    if let Ok(sender) = env::var(SENDER_ENV_VAR) {
        config.mail.sender = Some(sender);
    }
    if let Ok(api_key) = env::var(API_KEY_ENV_VAR) {
        config.mail.api_key = Some(api_key);
    }
}

/// Load configuration from a specific path plus `MASHUP__*` overrides
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // MASHUP__SOURCES__OVERSAMPLE -> sources.oversample
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
