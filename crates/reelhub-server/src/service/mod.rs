//! Application state and dependency injection.

mod config;
mod security;
mod session;

use reelhub_store::{StoreClient, StoreConfig};

pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::security::{
    AuthClaims, IssuedToken, PasswordHasher, SessionKeys, TokenKind, TokenPair,
};
pub use crate::service::session::SessionService;
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Attributes applied to the session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Whether cookies are restricted to secure transport.
    pub secure: bool,
}

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    // Storage:
    pub store: StoreClient,

    // Internal services:
    pub password_hasher: PasswordHasher,
    pub session_keys: SessionKeys,
    pub session_service: SessionService,
    pub cookie_policy: CookiePolicy,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Validates the configuration, creates an empty store and derives the
    /// signing keys.
    pub fn from_config(service_config: &ServiceConfig) -> Result<Self> {
        service_config.validate()?;

        let store = StoreClient::new(StoreConfig::new(service_config.store_lock_timeout()));
        let password_hasher = PasswordHasher::from_config(service_config)?;
        let session_keys = SessionKeys::from_config(service_config)?;
        let session_service =
            SessionService::new(store.clone(), password_hasher.clone(), session_keys.clone());

        Ok(Self {
            store,
            password_hasher,
            session_keys,
            session_service,
            cookie_policy: CookiePolicy {
                secure: service_config.secure_cookies,
            },
        })
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// Storage:
impl_di!(store: StoreClient);

// Internal services:
impl_di!(password_hasher: PasswordHasher);
impl_di!(session_keys: SessionKeys);
impl_di!(session_service: SessionService);
impl_di!(cookie_policy: CookiePolicy);
