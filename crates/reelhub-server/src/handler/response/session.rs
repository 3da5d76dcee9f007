//! Session response types.

use jiff::Timestamp;
use reelhub_store::model::User;
use serde::{Deserialize, Serialize};

use super::UserResponse;
use crate::service::TokenPair;

/// Response returned after login or refresh.
///
/// The credentials themselves travel only in `Set-Cookie` headers.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// The authenticated user.
    pub user: UserResponse,
    /// Timestamp when the access credential expires.
    pub access_token_expires_at: Timestamp,
    /// Timestamp when the refresh credential expires.
    pub refresh_token_expires_at: Timestamp,
}

impl SessionResponse {
    /// Creates a new instance of [`SessionResponse`].
    pub fn new(user: User, token_pair: &TokenPair) -> Self {
        Self {
            user: UserResponse::new(user),
            access_token_expires_at: token_pair.access_expires_at,
            refresh_token_expires_at: token_pair.refresh_expires_at,
        }
    }
}

/// Response returned after logout.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub logged_out: bool,
}

/// Response returned after a password change.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordResponse {
    pub password_changed: bool,
}
