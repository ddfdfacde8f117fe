//! Tracing setup and PII redaction for Honeycomb services
//!
//! Email addresses never reach log output in clear text. Call sites pass
//! them through [`redact_email`], and free-text messages that may contain
//! them through [`redact`].
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{init_tracing, redact_email, LoggerConfig};
//!
//! init_tracing(&LoggerConfig::default()).expect("tracing");
//! tracing::info!(email = %redact_email("user@example.com"), "Account registered");
//! ```

pub mod config;
pub mod redactor;

pub use config::*;
pub use redactor::*;

use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Install the global tracing subscriber and redactor.
///
/// `RUST_LOG` overrides the directives derived from `config`.
///
/// # Errors
///
/// Fails when the derived filter does not parse or a subscriber is already installed.
pub fn init_tracing(config: &LoggerConfig) -> Result<(), LoggerError> {
    install_redactor(PiiRedactor::new(RedactionConfig {
        hash_for_correlation: config.hash_for_correlation,
        ..RedactionConfig::default()
    }));

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.default_directives())
            .map_err(|e| LoggerError::InvalidFilter(e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if config.json {
        // Structured JSON logging for production
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339()),
            )
            .try_init()
    };

    installed.map_err(|e| LoggerError::AlreadyInstalled(e.to_string()))
}
