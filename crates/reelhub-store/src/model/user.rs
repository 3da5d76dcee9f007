//! User (subject) model.
//!
//! - [`User`] - stored subject with password hash and refresh credential
//! - [`NewUser`] - data for registering a subject
//! - [`UpdateUser`] - partial update of profile fields or password hash

use std::fmt;

use jiff::Timestamp;
use uuid::Uuid;

/// Stored subject record.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique, lowercase handle.
    pub username: String,
    /// Unique, lowercase email address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// The only refresh credential currently accepted for this user.
    pub refresh_token: Option<String>,
    /// Watched video ids, most recent first.
    pub watch_history: Vec<Uuid>,
    /// Timestamp when the user registered.
    pub created_at: Timestamp,
    /// Timestamp of the last profile or credential change.
    pub updated_at: Timestamp,
}

impl User {
    /// Returns whether a refresh credential is currently stored.
    #[inline]
    pub fn has_active_session(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Returns whether `token` is textually equal to the stored refresh credential.
    pub fn is_current_refresh_token(&self, token: &str) -> bool {
        self.refresh_token.as_deref() == Some(token)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("has_active_session", &self.has_active_session())
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Data for registering a new user.
#[derive(Debug, Default, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
}

/// Data for updating a user. Only `Some` fields are applied.
#[derive(Debug, Default, Clone)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// Normalizes a username or email for storage and lookup.
pub(crate) fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::now_v7(),
            username: "alice".into(),
            email: "alice@x.com".into(),
            full_name: "Alice".into(),
            password_hash: "$argon2id$secret".into(),
            refresh_token: Some("token".into()),
            watch_history: Vec::new(),
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    #[test]
    fn debug_omits_credentials() {
        let debug = format!("{:?}", user());
        assert!(debug.contains("alice"));
        assert!(!debug.contains("$argon2id$secret"));
        assert!(!debug.contains("\"token\""));
    }

    #[test]
    fn refresh_token_comparison_is_exact() {
        let user = user();
        assert!(user.is_current_refresh_token("token"));
        assert!(!user.is_current_refresh_token("Token"));
        assert!(!user.is_current_refresh_token("token "));
    }

    #[test]
    fn normalize_key_trims_and_lowercases() {
        assert_eq!(normalize_key("  Alice@X.com "), "alice@x.com");
    }
}
