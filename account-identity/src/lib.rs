//! Account management for Honeycomb
//!
//! Provides:
//! - Account registration with Argon2id password hashing
//! - Credential verification and HS256 bearer token issuance
//! - Pluggable account storage (in-memory and PostgreSQL)
//!
//! # Example
//!
//! ```rust,no_run
//! use account_identity::{AccountService, IdentityConfig, MemoryAccountStore};
//! use secrecy::SecretString;
//! use std::sync::Arc;
//!
//! # async fn run() -> account_identity::Result<()> {
//! let service = AccountService::from_config(
//!     Arc::new(MemoryAccountStore::new()),
//!     &SecretString::new("change-me".to_string()),
//!     IdentityConfig::default(),
//! )?;
//! let accounts = service.list_accounts().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod tokens;

pub use config::{IdentityConfig, PasswordParams};
pub use error::{IdentityError, Result, StoreError, StoreResult};
pub use models::*;
pub use password::PasswordCodec;
pub use repository::{with_timeout, AccountStore, MemoryAccountStore, PgAccountStore};
pub use service::{parse_account_id, AccountService};
pub use tokens::{IssuedToken, TokenClaims, TokenIssuer};
