//! Password hashing and verification using Argon2id.
//!
//! Hashes are PHC strings carrying the algorithm, cost parameters and a
//! random salt, so they can be verified without any other configuration.

use std::fmt;
use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};

use crate::Error;
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceConfig;
use crate::utility::tracing_targets::PASSWORD_HASHER as TRACING_TARGET;

/// Password used to compute the decoy hash for unknown subjects.
const DUMMY_PASSWORD: &str = "reelhub-dummy-password";

/// Argon2id password hashing service.
///
/// Cloning is cheap; the configured parameters and the decoy hash are shared.
#[derive(Clone)]
pub struct PasswordHasher {
    inner: Arc<PasswordHasherInner>,
}

struct PasswordHasherInner {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl PasswordHasher {
    /// Creates a hasher with the given Argon2id memory cost (KiB) and iteration count.
    pub fn new(memory_kib: u32, iterations: u32) -> crate::Result<Self> {
        let params = Params::new(memory_kib, iterations, 1, None).map_err(|e| {
            Error::internal("argon2", "invalid password hash parameters").with_source(e)
        })?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(DUMMY_PASSWORD.as_bytes(), &salt)
            .map_err(|e| Error::internal("argon2", "failed to compute decoy hash").with_source(e))?
            .to_string();

        Ok(Self {
            inner: Arc::new(PasswordHasherInner { argon2, dummy_hash }),
        })
    }

    /// Creates a hasher from the service configuration.
    pub fn from_config(config: &ServiceConfig) -> crate::Result<Self> {
        Self::new(config.password_hash_memory_kib, config.password_hash_iterations)
    }

    /// Hashes a password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InternalServerError`] if hashing fails.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .inner
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password hashing operation failed"
                );

                ErrorKind::InternalServerError
                    .with_message("Password processing failed")
                    .with_resource("authentication")
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored PHC hash.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidCredential`] if the password does not match
    /// - [`ErrorKind::InternalServerError`] if the stored hash is corrupt
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<()> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "stored password hash is malformed"
            );

            ErrorKind::InternalServerError
                .with_message("Authentication temporarily unavailable")
                .with_resource("authentication")
        })?;

        match self
            .inner
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(()),
            Err(ArgonError::Password) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    "password verification failed: incorrect password"
                );

                Err(ErrorKind::InvalidCredential
                    .with_message("Invalid username or password")
                    .with_resource("authentication"))
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password verification system error"
                );

                Err(ErrorKind::InternalServerError
                    .with_message("Authentication temporarily unavailable")
                    .with_resource("authentication"))
            }
        }
    }

    /// Spends one verification against the decoy hash.
    ///
    /// Called when the login subject does not exist so that the request takes
    /// as long as a real verification. Always returns `false`.
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        let _ = self.verify_password(password, &self.inner.dummy_hash);
        false
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.inner.argon2.params())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> anyhow::Result<PasswordHasher> {
        Ok(PasswordHasher::new(256, 1)?)
    }

    #[test]
    fn hash_and_verify_password() -> anyhow::Result<()> {
        let hasher = hasher()?;
        let hash = hasher.hash_password("secret123")?;

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("secret123", &hash).is_ok());
        assert!(hasher.verify_password("secret124", &hash).is_err());
        Ok(())
    }

    #[test]
    fn hash_produces_unique_salts() -> anyhow::Result<()> {
        let hasher = hasher()?;

        let hash1 = hasher.hash_password("secret123")?;
        let hash2 = hasher.hash_password("secret123")?;

        assert_ne!(hash1, hash2);
        assert!(hasher.verify_password("secret123", &hash1).is_ok());
        assert!(hasher.verify_password("secret123", &hash2).is_ok());
        Ok(())
    }

    #[test]
    fn wrong_password_is_invalid_credential() -> anyhow::Result<()> {
        let hasher = hasher()?;
        let hash = hasher.hash_password("secret123")?;

        let error = hasher.verify_password("wrong", &hash).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidCredential);
        Ok(())
    }

    #[test]
    fn corrupt_hash_is_internal_error() -> anyhow::Result<()> {
        let hasher = hasher()?;

        let error = hasher.verify_password("secret123", "not_a_phc_string").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        Ok(())
    }

    #[test]
    fn dummy_verification_never_succeeds() -> anyhow::Result<()> {
        let hasher = hasher()?;
        assert!(!hasher.verify_dummy_password(DUMMY_PASSWORD));
        assert!(!hasher.verify_dummy_password("secret123"));
        Ok(())
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(PasswordHasher::new(0, 0).is_err());
    }
}
