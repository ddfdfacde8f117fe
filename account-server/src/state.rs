use account_identity::AccountService;
use std::sync::Arc;
use std::time::Instant;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(accounts: Arc<AccountService>) -> Self {
        Self {
            accounts,
            started_at: Instant::now(),
        }
    }
}
