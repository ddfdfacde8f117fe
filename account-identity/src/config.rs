use crate::error::{IdentityError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted token lifetime (ten years)
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Lifetime of issued bearer tokens
    pub token_ttl_hours: i64,
    /// Upper bound on every store operation
    pub store_timeout_secs: u64,
    pub password_min_length: usize,
    pub password_hashing: PasswordParams,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            token_ttl_hours: 72,
            store_timeout_secs: 10,
            password_min_length: 8,
            password_hashing: PasswordParams::default(),
        }
    }
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl IdentityConfig {
    /// Token lifetime as a duration.
    ///
    /// # Errors
    ///
    /// `Configuration` unless `token_ttl_hours` is in `1..=MAX_TOKEN_TTL_HOURS`.
    pub fn token_ttl(&self) -> Result<chrono::Duration> {
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.token_ttl_hours) {
            return Err(IdentityError::Configuration(format!(
                "token_ttl_hours must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_HOURS, self.token_ttl_hours
            )));
        }
        chrono::Duration::try_hours(self.token_ttl_hours).ok_or_else(|| {
            IdentityError::Configuration("token_ttl_hours is out of range".to_string())
        })
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}
