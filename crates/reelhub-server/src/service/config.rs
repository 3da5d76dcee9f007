use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    /// Default access credential lifetime (1 day).
    pub const ACCESS_TOKEN_TTL_SECS: u64 = 86_400;

    /// Default refresh credential lifetime (10 days).
    pub const REFRESH_TOKEN_TTL_SECS: u64 = 864_000;

    /// Argon2id memory cost in KiB (OWASP baseline).
    pub const PASSWORD_HASH_MEMORY_KIB: u32 = 19_456;

    /// Argon2id iteration count (OWASP baseline).
    pub const PASSWORD_HASH_ITERATIONS: u32 = 2;

    /// Maximum wait for the store lock in milliseconds.
    pub const STORE_LOCK_TIMEOUT_MS: u64 = 5_000;

    /// Longest accepted credential lifetime (10 years).
    pub const MAX_TOKEN_TTL_SECS: u64 = 315_360_000;

    /// Minimum length of a signing secret in bytes.
    pub const MIN_SECRET_LEN: usize = 32;
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate", error = "Error")
)]
pub struct ServiceConfig {
    /// HMAC secret used to sign access credentials.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "ACCESS_TOKEN_SECRET", hide_env_values = true)
    )]
    pub access_token_secret: String,

    /// HMAC secret used to sign refresh credentials. Must differ from the access secret.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REFRESH_TOKEN_SECRET", hide_env_values = true)
    )]
    pub refresh_token_secret: String,

    /// Lifetime of access credentials in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "ACCESS_TOKEN_TTL", default_value_t = defaults::ACCESS_TOKEN_TTL_SECS)
    )]
    #[builder(default = "defaults::ACCESS_TOKEN_TTL_SECS")]
    pub access_token_ttl_secs: u64,

    /// Lifetime of refresh credentials in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REFRESH_TOKEN_TTL", default_value_t = defaults::REFRESH_TOKEN_TTL_SECS)
    )]
    #[builder(default = "defaults::REFRESH_TOKEN_TTL_SECS")]
    pub refresh_token_ttl_secs: u64,

    /// Whether session cookies carry the `Secure` attribute.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SECURE_COOKIES", default_value_t = true, action = clap::ArgAction::Set)
    )]
    #[builder(default = "true")]
    pub secure_cookies: bool,

    /// Argon2id memory cost in KiB.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PASSWORD_HASH_MEMORY_KIB", default_value_t = defaults::PASSWORD_HASH_MEMORY_KIB)
    )]
    #[builder(default = "defaults::PASSWORD_HASH_MEMORY_KIB")]
    pub password_hash_memory_kib: u32,

    /// Argon2id iteration count.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PASSWORD_HASH_ITERATIONS", default_value_t = defaults::PASSWORD_HASH_ITERATIONS)
    )]
    #[builder(default = "defaults::PASSWORD_HASH_ITERATIONS")]
    pub password_hash_iterations: u32,

    /// Maximum time in milliseconds a store operation waits for the store lock.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "STORE_LOCK_TIMEOUT_MS", default_value_t = defaults::STORE_LOCK_TIMEOUT_MS)
    )]
    #[builder(default = "defaults::STORE_LOCK_TIMEOUT_MS")]
    pub store_lock_timeout_ms: u64,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Returns the access credential lifetime.
    pub fn access_token_ttl(&self) -> SignedDuration {
        SignedDuration::from_secs(self.access_token_ttl_secs.min(i64::MAX as u64) as i64)
    }

    /// Returns the refresh credential lifetime.
    pub fn refresh_token_ttl(&self) -> SignedDuration {
        SignedDuration::from_secs(self.refresh_token_ttl_secs.min(i64::MAX as u64) as i64)
    }

    /// Returns the store lock timeout.
    pub fn store_lock_timeout(&self) -> Duration {
        Duration::from_millis(self.store_lock_timeout_ms)
    }

    /// Validates all configuration values.
    ///
    /// Configurations parsed from the command line bypass the builder, so
    /// [`ServiceState::from_config`] calls this again before using them.
    ///
    /// [`ServiceState::from_config`]: crate::service::ServiceState::from_config
    pub fn validate(&self) -> Result<()> {
        validate_secrets(&self.access_token_secret, &self.refresh_token_secret)?;
        validate_ttls(self.access_token_ttl_secs, self.refresh_token_ttl_secs)?;

        if self.password_hash_memory_kib == 0 || self.password_hash_iterations == 0 {
            return Err(Error::config(
                "Password hash memory and iterations must be greater than 0",
            ));
        }

        if self.store_lock_timeout_ms == 0 {
            return Err(Error::config("Store lock timeout must be greater than 0"));
        }

        Ok(())
    }
}

fn validate_secrets(access: &str, refresh: &str) -> Result<()> {
    if access.is_empty() || refresh.is_empty() {
        return Err(Error::config("Token secrets cannot be empty"));
    }

    if access.len() < defaults::MIN_SECRET_LEN || refresh.len() < defaults::MIN_SECRET_LEN {
        return Err(Error::config(format!(
            "Token secrets must be at least {} bytes long",
            defaults::MIN_SECRET_LEN
        )));
    }

    if access == refresh {
        return Err(Error::config(
            "Access and refresh token secrets must be different",
        ));
    }

    Ok(())
}

fn validate_ttls(access_secs: u64, refresh_secs: u64) -> Result<()> {
    if access_secs == 0 || refresh_secs == 0 {
        return Err(Error::config("Token lifetimes must be greater than 0"));
    }

    if access_secs >= refresh_secs {
        return Err(Error::config(
            "Access token lifetime must be shorter than refresh token lifetime",
        ));
    }

    if refresh_secs > defaults::MAX_TOKEN_TTL_SECS {
        return Err(Error::config(format!(
            "Token lifetimes cannot exceed {} seconds",
            defaults::MAX_TOKEN_TTL_SECS
        )));
    }

    Ok(())
}

impl ServiceConfigBuilder {
    fn validate(builder: &ServiceConfigBuilder) -> Result<()> {
        if let (Some(access), Some(refresh)) =
            (&builder.access_token_secret, &builder.refresh_token_secret)
        {
            validate_secrets(access, refresh)?;
        }

        let access_ttl = builder
            .access_token_ttl_secs
            .unwrap_or(defaults::ACCESS_TOKEN_TTL_SECS);
        let refresh_ttl = builder
            .refresh_token_ttl_secs
            .unwrap_or(defaults::REFRESH_TOKEN_TTL_SECS);
        validate_ttls(access_ttl, refresh_ttl)?;

        if builder.password_hash_memory_kib == Some(0)
            || builder.password_hash_iterations == Some(0)
        {
            return Err(Error::config(
                "Password hash memory and iterations must be greater than 0",
            ));
        }

        if builder.store_lock_timeout_ms == Some(0) {
            return Err(Error::config("Store lock timeout must be greater than 0"));
        }

        Ok(())
    }
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(error: derive_builder::UninitializedFieldError) -> Self {
        Error::config(format!("Missing required field: {}", error.field_name()))
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("secure_cookies", &self.secure_cookies)
            .field("password_hash_memory_kib", &self.password_hash_memory_kib)
            .field("password_hash_iterations", &self.password_hash_iterations)
            .field("store_lock_timeout_ms", &self.store_lock_timeout_ms)
            .finish_non_exhaustive()
    }
}

#[cfg(debug_assertions)]
impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            access_token_secret: "development-access-token-secret-0123456789".to_owned(),
            refresh_token_secret: "development-refresh-token-secret-0123456789".to_owned(),
            access_token_ttl_secs: defaults::ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: defaults::REFRESH_TOKEN_TTL_SECS,
            secure_cookies: false,
            // Minimal Argon2 cost keeps debug builds and tests fast.
            password_hash_memory_kib: 256,
            password_hash_iterations: 1,
            store_lock_timeout_ms: defaults::STORE_LOCK_TIMEOUT_MS,
        }
    }
}
