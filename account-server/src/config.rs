//! Server settings
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. `honeycomb.toml` (or the file passed with `--config`)
//! 3. `HONEYCOMB__*` environment variables, `__` separating nested keys
//!
//! Secrets are never read from files: `SECRET_KEY` and `DATABASE_URL` come
//! from the process environment only.

use account_identity::{config::MAX_TOKEN_TTL_HOURS, IdentityConfig};
use ::config::{Config, Environment, File, FileFormat};
use logger_redacted::LoggerConfig;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "honeycomb.toml";
pub const ENV_PREFIX: &str = "HONEYCOMB";
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Missing required environment variable {0}")]
    MissingEnv(&'static str),

    #[error("Invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub store: StoreBackend,
    /// Filled from `DATABASE_URL`, never from files
    #[serde(skip)]
    pub database_url: Option<String>,
    pub identity: IdentityConfig,
    pub log: LoggerConfig,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            store: StoreBackend::Memory,
            database_url: None,
            identity: IdentityConfig::default(),
            log: LoggerConfig {
                targets: vec!["account_server".to_string(), "account_identity".to_string()],
                ..LoggerConfig::default()
            },
        }
    }
}

impl ServerSettings {
    /// Load settings from defaults, the config file and `HONEYCOMB__*` variables.
    ///
    /// An explicitly named file must exist; the default file is optional.
    ///
    /// # Errors
    ///
    /// `Load` for unreadable or mistyped sources, `MissingEnv` when the postgres
    /// store is selected without `DATABASE_URL`, `Invalid` for rejected values.
    pub fn load(config_path: Option<&str>) -> Result<Self, SettingsError> {
        let (path, required) = match config_path {
            Some(path) => (path, true),
            None => (DEFAULT_CONFIG_FILE, false),
        };

        let config = Config::builder()
            .add_source(Config::try_from(&ServerSettings::default())?)
            .add_source(File::new(path, FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins"),
            )
            .build()?;

        let mut settings: ServerSettings = config.try_deserialize()?;
        settings.database_url = std::env::var(DATABASE_URL_VAR).ok();
        settings.validate()?;
        Ok(settings)
    }

    /// # Errors
    ///
    /// `Invalid` or `MissingEnv` describing the first rejected value.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.cors_allowed_origins.iter().any(|origin| origin.trim() == "*") {
            return Err(SettingsError::Invalid {
                key: "cors_allowed_origins",
                message: "wildcard origin cannot be combined with credentials".to_string(),
            });
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.identity.token_ttl_hours) {
            return Err(SettingsError::Invalid {
                key: "identity.token_ttl_hours",
                message: format!("must be between 1 and {}", MAX_TOKEN_TTL_HOURS),
            });
        }
        if self.identity.store_timeout_secs == 0 {
            return Err(SettingsError::Invalid {
                key: "identity.store_timeout_secs",
                message: "must be positive".to_string(),
            });
        }
        if self.store == StoreBackend::Postgres && self.database_url.is_none() {
            return Err(SettingsError::MissingEnv(DATABASE_URL_VAR));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// `Invalid` if `host:port` is not a socket address.
    pub fn bind_address(&self) -> Result<SocketAddr, SettingsError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| SettingsError::Invalid {
                key: "host",
                message: format!("{}", e),
            })
    }
}

/// Token signing secret from `SECRET_KEY`.
///
/// # Errors
///
/// `MissingEnv` when the variable is unset or empty.
pub fn signing_secret_from_env() -> Result<SecretString, SettingsError> {
    match std::env::var(SECRET_KEY_VAR) {
        Ok(secret) if !secret.is_empty() => Ok(SecretString::new(secret)),
        _ => Err(SettingsError::MissingEnv(SECRET_KEY_VAR)),
    }
}
