//! Password hashing and verification.
//!
//! Argon2id with configurable cost. Hashing and verification are CPU-bound
//! and run on the blocking pool so request tasks are never stalled.

use crate::{
    config::PasswordParams,
    error::{IdentityError, Result},
    models::PasswordDigest,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

/// Output length of the raw Argon2 hash in bytes
const HASH_LENGTH: usize = 32;

/// Input hashed once at construction; login attempts for unknown emails verify against it
const TIMING_EQUALISER: &str = "honeycomb:unknown-account";

#[derive(Clone)]
pub struct PasswordCodec {
    argon2: Argon2<'static>,
    dummy: PasswordDigest,
}

impl PasswordCodec {
    /// Build a codec with the given Argon2id cost parameters.
    ///
    /// # Errors
    ///
    /// `Configuration` if the parameters are rejected by argon2, `Hashing` if
    /// the timing-equaliser digest cannot be produced.
    pub fn new(params: PasswordParams) -> Result<Self> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            Some(HASH_LENGTH),
        )
        .map_err(|e| IdentityError::Configuration(format!("Invalid Argon2 parameters: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy = hash_with(&argon2, TIMING_EQUALISER)?;

        Ok(Self { argon2, dummy })
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// `Hashing` if argon2 fails or the blocking task is lost.
    pub async fn hash_password(&self, password: &SecretString) -> Result<PasswordDigest> {
        let argon2 = self.argon2.clone();
        let password = SecretString::new(password.expose_secret().to_owned());

        tokio::task::spawn_blocking(move || hash_with(&argon2, password.expose_secret()))
            .await
            .map_err(|e| IdentityError::Hashing(format!("Password hashing task failed: {}", e)))?
    }

    /// Check a plaintext password against a stored digest.
    ///
    /// Mismatches, malformed digests and lost tasks all read as `false`.
    pub async fn verify_password(&self, password: &SecretString, digest: &PasswordDigest) -> bool {
        let argon2 = self.argon2.clone();
        let password = SecretString::new(password.expose_secret().to_owned());
        let digest = digest.clone();

        match tokio::task::spawn_blocking(move || {
            verify_with(&argon2, password.expose_secret(), &digest)
        })
        .await
        {
            Ok(matched) => matched,
            Err(e) => {
                warn!(error = %e, "Password verification task failed");
                false
            }
        }
    }

    /// Spend one verification's worth of work without a real account.
    pub async fn verify_dummy(&self, password: &SecretString) {
        let dummy = self.dummy.clone();
        let _ = self.verify_password(password, &dummy).await;
    }

    #[cfg(test)]
    pub(crate) fn hash_blocking(&self, password: &str) -> Result<PasswordDigest> {
        hash_with(&self.argon2, password)
    }

    #[cfg(test)]
    pub(crate) fn verify_blocking(&self, password: &str, digest: &PasswordDigest) -> bool {
        verify_with(&self.argon2, password, digest)
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<PasswordDigest> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| PasswordDigest::new(hash.to_string()))
        .map_err(|e| IdentityError::Hashing(format!("Failed to hash password: {}", e)))
}

fn verify_with(argon2: &Argon2<'_>, password: &str, digest: &PasswordDigest) -> bool {
    let parsed = match PasswordHash::new(digest.as_str()) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "Stored password digest is malformed");
            return false;
        }
    };

    // Parameters and salt come from the digest itself
    match argon2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => true,
        Err(argon2::password_hash::Error::Password) => false,
        Err(e) => {
            warn!(error = %e, "Password verification error");
            false
        }
    }
}

#[cfg(test)]
pub(crate) fn cheap_params() -> PasswordParams {
    PasswordParams {
        memory_kib: 256,
        iterations: 1,
        parallelism: 1,
    }
}
