//! PostgreSQL-backed account store
//!
//! Accounts live in a single `accounts` table:
//! - `email` carries a UNIQUE constraint, so concurrent registrations cannot both land
//! - issued tokens are a `TEXT[]` column appended in place

use crate::{
    error::{StoreError, StoreResult},
    models::{Account, AccountDraft, PasswordDigest},
    repository::AccountStore,
};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id            UUID PRIMARY KEY,
    first_name    TEXT,
    last_name     TEXT,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    tokens        TEXT[] NOT NULL DEFAULT '{}',
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    first_name: Option<String>,
    last_name: Option<String>,
    email: String,
    password_hash: String,
    tokens: Vec<String>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: PasswordDigest::new(row.password_hash),
            tokens: row.tokens,
        }
    }
}

/// PostgreSQL-backed account store
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create with connection string
    ///
    /// # Errors
    ///
    /// `StoreError::Backend` if the pool cannot connect.
    pub async fn connect(connection_string: &str, acquire_timeout: Duration) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(acquire_timeout)
            .connect(connection_string)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect: {}", e)))?;

        info!("Account store connection pool created");
        Ok(Self::new(pool))
    }

    /// Create the `accounts` table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// `StoreError::Backend` if the DDL fails.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        debug!("Account schema ensured");
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_all(&self) -> StoreResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, tokens
            FROM accounts
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, tokens
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::from).ok_or(StoreError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, tokens
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::from).ok_or(StoreError::NotFound)
    }

    async fn insert(&self, draft: AccountDraft) -> StoreResult<Uuid> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO accounts (id, first_name, last_name, email, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.email)
        .bind(draft.password_hash.as_str())
        .execute(&self.pool)
        .await?;

        debug!(account_id = %id, "Account inserted");
        Ok(id)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn append_token(&self, id: Uuid, token: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE accounts SET tokens = array_append(tokens, $2) WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
