//! Bearer token issuance.
//!
//! Tokens are HS256 JWTs signed with a server-held secret. The payload binds
//! the account id and email together with an expiry.

use crate::error::{IdentityError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload carried by every issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account id
    pub id: String,

    pub email: String,

    /// Issued at (seconds since epoch)
    pub iat: i64,

    /// Expiration (seconds since epoch)
    pub exp: i64,

    /// Unique token identifier, keeps tokens minted within the same second distinct
    pub jti: String,
}

impl TokenClaims {
    /// # Errors
    ///
    /// `Signing` when `issued_at + ttl` falls outside the representable time range.
    pub fn new(
        account_id: Uuid,
        email: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| IdentityError::Signing("Token expiry out of range".to_string()))?;

        Ok(Self {
            id: account_id.to_string(),
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// Account id as UUID
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the claim does not hold a UUID.
    pub fn account_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.id)
            .map_err(|_| IdentityError::InvalidInput("Invalid account id in token".to_string()))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// A freshly signed token and its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Signs bearer tokens for authenticated accounts.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer bound to `secret`.
    ///
    /// # Errors
    ///
    /// `Configuration` when the secret is empty; an issuer never signs with an empty key.
    pub fn new(secret: &SecretString, ttl: Duration) -> Result<Self> {
        let bytes = secret.expose_secret().as_bytes();
        if bytes.is_empty() {
            return Err(IdentityError::Configuration(
                "Token signing secret must not be empty".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for the account, valid for the configured ttl from now.
    ///
    /// # Errors
    ///
    /// `Signing` if the JWT cannot be encoded.
    pub fn issue(&self, account_id: Uuid, email: &str) -> Result<IssuedToken> {
        self.issue_at(account_id, email, Utc::now())
    }

    /// Issue a token with an explicit issuance time.
    ///
    /// # Errors
    ///
    /// `Signing` if the expiry overflows or the JWT cannot be encoded.
    pub fn issue_at(
        &self,
        account_id: Uuid,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken> {
        let claims = TokenClaims::new(account_id, email, issued_at, self.ttl)?;
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| IdentityError::Signing(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify the signature and expiry of a token and return its payload.
    ///
    /// Nothing on the request path calls this; incoming bearer tokens are not
    /// checked by the service.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for a bad signature, an expired token or a malformed payload.
    pub fn decode(&self, token: &str) -> Result<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| IdentityError::InvalidCredentials)
    }
}
