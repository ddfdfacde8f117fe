use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Argon2 PHC string for an account secret.
///
/// Never serialized into API payloads and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn new(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest([REDACTED])")
    }
}

/// Persisted account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: PasswordDigest,
    /// Issued bearer tokens, in append order.
    pub tokens: Vec<String>,
}

/// Account fields supplied to the store on insert; the store assigns the id.
#[derive(Debug, Clone)]
pub struct AccountDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: PasswordDigest,
}

impl AccountDraft {
    pub fn into_account(self, id: Uuid) -> Account {
        Account {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            tokens: Vec::new(),
        }
    }
}

/// Account as exposed outside the service; carries no password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            tokens: account.tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_debug_is_redacted() {
        let digest = PasswordDigest::new("$argon2id$v=19$m=256,t=1,p=1$c2FsdA$aGFzaA");
        let rendered = format!("{:?}", digest);
        assert!(!rendered.contains("argon2id"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_view_drops_password_and_empty_fields() {
        let account = Account {
            id: Uuid::new_v4(),
            first_name: None,
            last_name: Some("Lovelace".to_string()),
            email: "ada@example.com".to_string(),
            password_hash: PasswordDigest::new("$argon2id$secret"),
            tokens: Vec::new(),
        };

        let json = serde_json::to_value(AccountView::from(account)).unwrap();
        let object = json.as_object().unwrap();

        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("password_hash"));
        assert!(!object.contains_key("first_name"));
        assert!(!object.contains_key("tokens"));
        assert_eq!(object["last_name"], "Lovelace");
        assert_eq!(object["email"], "ada@example.com");
    }

    #[test]
    fn test_create_request_accepts_missing_names() {
        let request: CreateAccountRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"secret123"}"#).unwrap();
        assert_eq!(request.email, "a@x.com");
        assert!(request.first_name.is_none());
        assert!(request.last_name.is_none());
    }
}
