use crate::{
    config::IdentityConfig,
    error::{IdentityError, Result, StoreError, StoreResult},
    models::*,
    password::PasswordCodec,
    repository::{with_timeout, AccountStore},
    tokens::TokenIssuer,
};
use logger_redacted::redact_email;
use secrecy::{ExposeSecret, SecretString};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub struct AccountService {
    store: Arc<dyn AccountStore>,
    codec: PasswordCodec,
    issuer: TokenIssuer,
    config: IdentityConfig,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        codec: PasswordCodec,
        issuer: TokenIssuer,
        config: IdentityConfig,
    ) -> Self {
        Self {
            store,
            codec,
            issuer,
            config,
        }
    }

    /// Build the codec and issuer from configuration and wire them to `store`.
    ///
    /// # Errors
    ///
    /// `Configuration` for an empty signing secret, an out-of-range token ttl
    /// or rejected hashing parameters.
    pub fn from_config(
        store: Arc<dyn AccountStore>,
        signing_secret: &SecretString,
        config: IdentityConfig,
    ) -> Result<Self> {
        let codec = PasswordCodec::new(config.password_hashing)?;
        let issuer = TokenIssuer::new(signing_secret, config.token_ttl()?)?;
        Ok(Self::new(store, codec, issuer, config))
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// All accounts without password material. An empty store is `Ok(vec![])`.
    ///
    /// # Errors
    ///
    /// `Timeout` or `Store` when the store fails.
    pub async fn list_accounts(&self) -> Result<Vec<AccountView>> {
        let accounts = self.bounded(self.store.find_all()).await?;
        debug!(count = accounts.len(), "Listed accounts");
        Ok(accounts.into_iter().map(AccountView::from).collect())
    }

    /// # Errors
    ///
    /// `InvalidInput` for a malformed id, `NotFound`, `Timeout` or `Store`.
    pub async fn get_account(&self, id: &str) -> Result<AccountView> {
        let id = parse_account_id(id)?;
        let account = self.bounded(self.store.find_by_id(id)).await?;
        Ok(account.into())
    }

    /// # Errors
    ///
    /// `InvalidInput` for a malformed id, `NotFound` when nothing was deleted, `Timeout` or `Store`.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, id: &str) -> Result<()> {
        let id = parse_account_id(id)?;
        let deleted = self.bounded(self.store.delete_by_id(id)).await?;
        if deleted == 0 {
            return Err(IdentityError::NotFound);
        }

        info!(account_id = %id, "Account deleted");
        Ok(())
    }

    /// Create an account after checking the email is free.
    ///
    /// # Errors
    ///
    /// `InvalidInput`, `DuplicateEmail`, `Hashing`, `Timeout` or `Store`.
    pub async fn register(&self, request: CreateAccountRequest) -> Result<AccountView> {
        let email = validate_email(&request.email)?;
        self.validate_password(&request.password)?;

        match self.bounded(self.store.find_by_email(&email)).await {
            Ok(_) => {
                info!(email = %redact_email(&email), "Registration rejected: email already in use");
                return Err(IdentityError::DuplicateEmail);
            }
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let password_hash = self.codec.hash_password(&request.password).await?;

        let draft = AccountDraft {
            first_name: request.first_name,
            last_name: request.last_name,
            email,
            password_hash,
        };
        let mut view = AccountView {
            id: Uuid::nil(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            email: draft.email.clone(),
            tokens: Vec::new(),
        };

        // The store's unique constraint catches a concurrent registration that passed the lookup
        view.id = self.bounded(self.store.insert(draft)).await?;

        info!(account_id = %view.id, email = %redact_email(&view.email), "Account registered");
        Ok(view)
    }

    /// Verify credentials, issue a token and record it on the account.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown email or wrong password (indistinguishable),
    /// `Signing`, `Timeout` or `Store` for failures after the credentials check.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        let email = request.email.trim();

        let account = match self.bounded(self.store.find_by_email(email)).await {
            Ok(account) => account,
            Err(e) => {
                if e != StoreError::NotFound {
                    warn!(error = %e, "Account lookup failed during login");
                }
                self.codec.verify_dummy(&request.password).await;
                return Err(IdentityError::InvalidCredentials);
            }
        };

        if !self
            .codec
            .verify_password(&request.password, &account.password_hash)
            .await
        {
            info!(email = %redact_email(email), "Login rejected");
            return Err(IdentityError::InvalidCredentials);
        }

        let issued = self.issuer.issue(account.id, &account.email)?;

        match self.bounded(self.store.append_token(account.id, &issued.token)).await {
            Ok(()) => {}
            Err(StoreError::NotFound) => {
                return Err(IdentityError::Store(
                    "Account removed before token could be recorded".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        let expires_at = issued
            .claims
            .expires_at()
            .ok_or_else(|| IdentityError::Signing("Token expiry out of range".to_string()))?;

        info!(account_id = %account.id, "Login succeeded");
        Ok(LoginResponse {
            token: issued.token,
            expires_at,
        })
    }

    async fn bounded<T, F>(&self, operation: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        with_timeout(self.config.store_timeout(), operation).await
    }

    fn validate_password(&self, password: &SecretString) -> Result<()> {
        if password.expose_secret().chars().count() < self.config.password_min_length {
            return Err(IdentityError::InvalidInput(format!(
                "Password must be at least {} characters long",
                self.config.password_min_length
            )));
        }
        Ok(())
    }
}

/// Parse an account id from its textual form.
///
/// # Errors
///
/// `InvalidInput` when `raw` is not a UUID.
pub fn parse_account_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| IdentityError::InvalidInput(format!("Invalid account id: {}", raw)))
}

fn validate_email(raw: &str) -> Result<String> {
    let email = raw.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(IdentityError::InvalidInput("Invalid email address".to_string()));
    }
    Ok(email.to_string())
}
