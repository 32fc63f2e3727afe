//! Configuration parsing and validation for timeclerkd
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Ledger table and field-name mapping (one canonical schema,
//!   no runtime probing of alternates)
//! - SMS gateway and lifecycle behavior settings
//! - Validation with clear error messages
//!
//! Secrets never live in the config file; they come from the
//! environment via [`Secrets::from_env`].

mod schema;
mod settings;
mod validation;

pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),

    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Config::from_raw(raw))
}

/// Credentials pulled from the environment at startup
#[derive(Debug, Clone)]
pub struct Secrets {
    /// Bearer token for the Ledger API
    pub ledger_token: String,

    /// Auth token for the SMS gateway
    pub sms_auth_token: String,

    /// Shared secret gating the sweep endpoints
    pub sweep_key: String,
}

pub const LEDGER_TOKEN_ENV: &str = "TIMECLERK_LEDGER_TOKEN";
pub const SMS_AUTH_TOKEN_ENV: &str = "TIMECLERK_SMS_AUTH_TOKEN";
pub const SWEEP_KEY_ENV: &str = "TIMECLERK_SWEEP_KEY";

impl Secrets {
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            ledger_token: require_env(LEDGER_TOKEN_ENV)?,
            sms_auth_token: require_env(SMS_AUTH_TOKEN_ENV)?,
            sweep_key: require_env(SWEEP_KEY_ENV)?,
        })
    }
}

fn require_env(name: &'static str) -> ConfigResult<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}
