#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for client-related operations.
///
/// Use this target for logging client initialization, configuration, and lifecycle events.
pub const TRACING_TARGET_CLIENT: &str = "reelhub_store::client";

/// Tracing target for store query operations.
///
/// Use this target for logging query execution, results, and query-related errors.
pub const TRACING_TARGET_QUERY: &str = "reelhub_store::queries";

mod client;
pub mod model;
pub mod query;

use std::borrow::Cow;

use uuid::Uuid;

pub use crate::client::{StoreClient, StoreConfig};

/// Error type for all store operations.
#[derive(Debug, thiserror::Error)]
#[must_use = "store errors should be handled appropriately"]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    ///
    /// The constraint name identifies which unique key collided
    /// (see [`constraint`]).
    #[error("Unique constraint violated: {constraint}")]
    Conflict { constraint: &'static str },

    /// The record an update targets does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// The store lock could not be acquired in time.
    #[error("Store operation timed out: {operation}")]
    Timeout { operation: &'static str },

    /// The store has been closed and accepts no more operations.
    #[error("Store unavailable: {0}")]
    Unavailable(Cow<'static, str>),
}

impl StoreError {
    /// Returns the violated constraint name, if this is a conflict.
    pub fn constraint(&self) -> Option<&'static str> {
        match self {
            Self::Conflict { constraint } => Some(constraint),
            _ => None,
        }
    }
}

/// Names of the unique keys enforced by the store.
pub mod constraint {
    /// Usernames are unique after case normalization.
    pub const USERS_USERNAME_KEY: &str = "users_username_key";
    /// Email addresses are unique after case normalization.
    pub const USERS_EMAIL_KEY: &str = "users_email_key";
}

/// Specialized [`Result`] type for store operations.
pub type StoreResult<T, E = StoreError> = Result<T, E>;
