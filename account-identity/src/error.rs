use std::time::Duration;
use thiserror::Error;

/// Failures reported by an [`AccountStore`](crate::repository::AccountStore) adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Account not found")]
    NotFound,

    #[error("Email already in use")]
    DuplicateEmail,

    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Email already in use")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account not found")]
    NotFound,

    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<StoreError> for IdentityError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => IdentityError::NotFound,
            StoreError::DuplicateEmail => IdentityError::DuplicateEmail,
            StoreError::Timeout(after) => IdentityError::Timeout(after),
            StoreError::Backend(message) => IdentityError::Store(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, IdentityError>;
