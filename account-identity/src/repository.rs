use crate::{
    error::{StoreError, StoreResult},
    models::{Account, AccountDraft},
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

pub mod postgres;

pub use postgres::PgAccountStore;

/// Persistence contract for account records.
///
/// Implementations must be safe to share between concurrently running requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<Account>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Account>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Account>;

    /// Persist a new account and return the id the store assigned to it.
    async fn insert(&self, draft: AccountDraft) -> StoreResult<Uuid>;

    /// Remove an account, returning how many records were deleted.
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<u64>;

    async fn append_token(&self, id: Uuid, token: &str) -> StoreResult<()>;
}

/// Run a store operation under a deadline.
///
/// # Errors
///
/// `StoreError::Timeout` when `limit` elapses first, otherwise whatever the operation returns.
pub async fn with_timeout<T, F>(limit: Duration, operation: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

#[derive(Default)]
struct MemoryInner {
    accounts: HashMap<Uuid, Account>,
    by_email: HashMap<String, Uuid>,
    order: Vec<Uuid>,
}

/// In-memory account store for development and testing.
///
/// Email uniqueness is checked and claimed under a single write lock.
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_all(&self) -> StoreResult<Vec<Account>> {
        let inner = self.inner.read();
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.accounts.get(id).cloned())
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Account> {
        self.inner
            .read()
            .accounts
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Account> {
        let inner = self.inner.read();
        inner
            .by_email
            .get(email)
            .and_then(|id| inner.accounts.get(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert(&self, draft: AccountDraft) -> StoreResult<Uuid> {
        let mut inner = self.inner.write();
        if inner.by_email.contains_key(&draft.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let id = Uuid::new_v4();
        inner.by_email.insert(draft.email.clone(), id);
        inner.accounts.insert(id, draft.into_account(id));
        inner.order.push(id);
        Ok(id)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<u64> {
        let mut inner = self.inner.write();
        match inner.accounts.remove(&id) {
            Some(account) => {
                inner.by_email.remove(&account.email);
                inner.order.retain(|existing| *existing != id);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn append_token(&self, id: Uuid, token: &str) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let account = inner.accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        account.tokens.push(token.to_string());
        Ok(())
    }
}
