//! Session lifecycle: login, refresh, logout and password change.
//!
//! A user is either anonymous or holds exactly one session. Login issues a
//! fresh credential pair and replaces any stored refresh credential, refresh
//! rotates the pair, and logout clears the stored refresh credential.

use reelhub_store::StoreClient;
use reelhub_store::model::{UpdateUser, User};
use reelhub_store::query::{SessionRepository, UserRepository};
use uuid::Uuid;

use crate::handler::{ErrorKind, Result};
use crate::service::security::{PasswordHasher, SessionKeys, TokenKind, TokenPair};
use crate::utility::tracing_targets::SESSION as TRACING_TARGET;

/// Drives the per-user session state machine.
///
/// Cloning is cheap; all clones share the same store and keys.
#[derive(Debug, Clone)]
pub struct SessionService {
    store: StoreClient,
    password_hasher: PasswordHasher,
    session_keys: SessionKeys,
}

impl SessionService {
    /// Creates a new session service.
    pub fn new(store: StoreClient, password_hasher: PasswordHasher, session_keys: SessionKeys) -> Self {
        Self {
            store,
            password_hasher,
            session_keys,
        }
    }

    /// Authenticates a user by username or email and password.
    ///
    /// Each identifier is matched against both usernames and emails, in
    /// order, and the first user found is the one authenticated. On success
    /// the new refresh credential replaces whatever was stored before, which
    /// ends any earlier session of the same user.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotFound`] if no user matches any of `identifiers`
    /// - [`ErrorKind::InvalidCredential`] if the password does not match
    pub async fn login(&self, identifiers: &[&str], password: &str) -> Result<(User, TokenPair)> {
        let mut found = None;
        for identifier in identifiers {
            found = self.store.find_user_by_username_or_email(identifier).await?;
            if found.is_some() {
                break;
            }
        }

        let Some(mut user) = found else {
            self.password_hasher.verify_dummy_password(password);

            tracing::warn!(
                target: TRACING_TARGET,
                "login failed: user does not exist"
            );

            return Err(ErrorKind::NotFound
                .with_message("User does not exist")
                .with_resource("user"));
        };

        if let Err(error) = self
            .password_hasher
            .verify_password(password, &user.password_hash)
        {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %user.id,
                "login failed: password rejected"
            );
            return Err(error);
        }

        let token_pair = self.session_keys.issue_pair(user.id)?;
        self.store
            .set_refresh_token(user.id, Some(token_pair.refresh_token.clone()))
            .await?;
        user.refresh_token = Some(token_pair.refresh_token.clone());

        tracing::info!(
            target: TRACING_TARGET,
            user_id = %user.id,
            "user logged in"
        );

        Ok((user, token_pair))
    }

    /// Exchanges a refresh credential for a new credential pair.
    ///
    /// The presented credential is single-use: it stops working as soon as
    /// this call succeeds, and of two concurrent calls presenting it only
    /// one succeeds.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Unauthenticated`] if no credential is presented
    /// - [`ErrorKind::InvalidCredential`] if the credential fails verification
    /// - [`ErrorKind::NotFound`] if its subject no longer exists
    /// - [`ErrorKind::StaleCredential`] if it is no longer the stored one
    pub async fn refresh(&self, presented: Option<&str>) -> Result<(User, TokenPair)> {
        let presented = presented
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ErrorKind::Unauthenticated
                    .with_message("Refresh token is required")
                    .with_resource("session")
            })?;

        let claims = self.session_keys.verify(presented, TokenKind::Refresh)?;

        let Some(mut user) = self.store.find_user_by_id(claims.subject_id).await? else {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %claims.subject_id,
                "refresh failed: user does not exist"
            );

            return Err(ErrorKind::NotFound
                .with_message("User does not exist")
                .with_resource("user"));
        };

        if !user.is_current_refresh_token(presented) {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %user.id,
                active_session = user.has_active_session(),
                "refresh failed: credential is not the stored one"
            );
            return Err(stale_credential());
        }

        let token_pair = self.session_keys.issue_pair(user.id)?;
        let swapped = self
            .store
            .swap_refresh_token(user.id, presented, token_pair.refresh_token.clone())
            .await?;

        if !swapped {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %user.id,
                "refresh failed: credential rotated concurrently"
            );
            return Err(stale_credential());
        }

        user.refresh_token = Some(token_pair.refresh_token.clone());

        tracing::info!(
            target: TRACING_TARGET,
            user_id = %user.id,
            "session refreshed"
        );

        Ok((user, token_pair))
    }

    /// Ends the session of a user. Logging out twice is not an error.
    pub async fn logout(&self, user_id: Uuid) -> Result<()> {
        self.store.set_refresh_token(user_id, None).await?;

        tracing::info!(
            target: TRACING_TARGET,
            user_id = %user_id,
            "user logged out"
        );

        Ok(())
    }

    /// Replaces the password of a user after checking the current one.
    ///
    /// The stored refresh credential is left untouched.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotFound`] if the user does not exist
    /// - [`ErrorKind::InvalidCredential`] if `current_password` does not match
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| {
                ErrorKind::NotFound
                    .with_message("User does not exist")
                    .with_resource("user")
            })?;

        if let Err(error) = self
            .password_hasher
            .verify_password(current_password, &user.password_hash)
        {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %user_id,
                "password change rejected: current password does not match"
            );
            return Err(error);
        }

        let password_hash = self.password_hasher.hash_password(new_password)?;
        let updates = UpdateUser {
            password_hash: Some(password_hash),
            ..UpdateUser::default()
        };
        self.store.update_user(user_id, updates).await?;

        tracing::info!(
            target: TRACING_TARGET,
            user_id = %user_id,
            "password changed"
        );

        Ok(())
    }
}

fn stale_credential() -> crate::handler::Error<'static> {
    ErrorKind::StaleCredential
        .with_message("Refresh token has expired or has already been used")
        .with_resource("session")
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use reelhub_store::model::NewUser;

    use super::*;

    struct Fixture {
        store: StoreClient,
        keys: SessionKeys,
        sessions: SessionService,
        user_id: Uuid,
    }

    async fn fixture() -> anyhow::Result<Fixture> {
        let store = StoreClient::default();
        let hasher = PasswordHasher::new(256, 1)?;
        let keys = SessionKeys::new(
            b"access-secret-access-secret-access-secret",
            b"refresh-secret-refresh-secret-refresh-secret",
            SignedDuration::from_mins(15),
            SignedDuration::from_hours(24),
        );

        let user = store
            .create_user(NewUser {
                username: "alice".into(),
                email: "alice@x.com".into(),
                full_name: "Alice".into(),
                password_hash: hasher.hash_password("secret123")?,
            })
            .await?;

        let sessions = SessionService::new(store.clone(), hasher, keys.clone());
        Ok(Fixture {
            store,
            keys,
            sessions,
            user_id: user.id,
        })
    }

    fn kind<T>(result: Result<T>) -> Option<ErrorKind> {
        result.err().map(|e| e.kind())
    }

    #[tokio::test]
    async fn login_stores_issued_refresh_token() -> anyhow::Result<()> {
        let f = fixture().await?;

        let (user, pair) = f.sessions.login(&["alice"], "secret123").await?;
        assert_eq!(user.id, f.user_id);

        let stored = f.store.find_refresh_token(f.user_id).await?.flatten();
        assert_eq!(stored.as_deref(), Some(pair.refresh_token.as_str()));
        Ok(())
    }

    #[tokio::test]
    async fn login_accepts_email_in_any_case() -> anyhow::Result<()> {
        let f = fixture().await?;

        let (user, _) = f.sessions.login(&["  Alice@X.com "], "secret123").await?;
        assert_eq!(user.id, f.user_id);
        Ok(())
    }

    #[tokio::test]
    async fn login_with_wrong_password_leaves_store_untouched() -> anyhow::Result<()> {
        let f = fixture().await?;
        let (_, pair) = f.sessions.login(&["alice"], "secret123").await?;

        let result = f.sessions.login(&["alice"], "wrong-password").await;
        assert_eq!(kind(result), Some(ErrorKind::InvalidCredential));

        let stored = f.store.find_refresh_token(f.user_id).await?.flatten();
        assert_eq!(stored.as_deref(), Some(pair.refresh_token.as_str()));
        Ok(())
    }

    #[tokio::test]
    async fn login_falls_back_to_later_identifiers() -> anyhow::Result<()> {
        let f = fixture().await?;

        let (user, _) = f.sessions.login(&["alicee", "alice@x.com"], "secret123").await?;
        assert_eq!(user.id, f.user_id);

        let result = f.sessions.login(&[], "secret123").await;
        assert_eq!(kind(result), Some(ErrorKind::NotFound));
        Ok(())
    }

    #[tokio::test]
    async fn login_with_unknown_user_is_not_found() -> anyhow::Result<()> {
        let f = fixture().await?;

        let result = f.sessions.login(&["bob"], "secret123").await;
        assert_eq!(kind(result), Some(ErrorKind::NotFound));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_rotates_credentials() -> anyhow::Result<()> {
        let f = fixture().await?;
        let (_, first) = f.sessions.login(&["alice"], "secret123").await?;

        let (_, second) = f.sessions.refresh(Some(&first.refresh_token)).await?;
        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(first.access_token, second.access_token);

        let replay = f.sessions.refresh(Some(&first.refresh_token)).await;
        assert_eq!(kind(replay), Some(ErrorKind::StaleCredential));

        f.sessions.refresh(Some(&second.refresh_token)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn refresh_without_token_is_unauthenticated() -> anyhow::Result<()> {
        let f = fixture().await?;

        assert_eq!(kind(f.sessions.refresh(None).await), Some(ErrorKind::Unauthenticated));
        assert_eq!(kind(f.sessions.refresh(Some("  ")).await), Some(ErrorKind::Unauthenticated));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_rejects_access_token() -> anyhow::Result<()> {
        let f = fixture().await?;
        let (_, pair) = f.sessions.login(&["alice"], "secret123").await?;

        let result = f.sessions.refresh(Some(&pair.access_token)).await;
        assert_eq!(kind(result), Some(ErrorKind::InvalidCredential));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_rejects_expired_token() -> anyhow::Result<()> {
        let f = fixture().await?;
        let expired = f
            .keys
            .issue(f.user_id, TokenKind::Refresh, SignedDuration::from_secs(-1))?;
        f.store
            .set_refresh_token(f.user_id, Some(expired.token.clone()))
            .await?;

        let result = f.sessions.refresh(Some(&expired.token)).await;
        assert_eq!(kind(result), Some(ErrorKind::InvalidCredential));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_for_unknown_subject_is_not_found() -> anyhow::Result<()> {
        let f = fixture().await?;
        let orphan = f
            .keys
            .issue(Uuid::now_v7(), TokenKind::Refresh, SignedDuration::from_mins(5))?;

        let result = f.sessions.refresh(Some(&orphan.token)).await;
        assert_eq!(kind(result), Some(ErrorKind::NotFound));
        Ok(())
    }

    #[tokio::test]
    async fn logout_revokes_refresh_token() -> anyhow::Result<()> {
        let f = fixture().await?;
        let (_, pair) = f.sessions.login(&["alice"], "secret123").await?;

        f.sessions.logout(f.user_id).await?;
        f.sessions.logout(f.user_id).await?;

        let result = f.sessions.refresh(Some(&pair.refresh_token)).await;
        assert_eq!(kind(result), Some(ErrorKind::StaleCredential));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_refreshes_have_one_winner() -> anyhow::Result<()> {
        let f = fixture().await?;
        let (_, pair) = f.sessions.login(&["alice"], "secret123").await?;

        let (a, b) = tokio::join!(
            f.sessions.refresh(Some(&pair.refresh_token)),
            f.sessions.refresh(Some(&pair.refresh_token)),
        );

        let winners = [a.is_ok(), b.is_ok()].into_iter().filter(|ok| *ok).count();
        assert_eq!(winners, 1);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_logins_leave_one_valid_session() -> anyhow::Result<()> {
        let f = fixture().await?;

        let (a, b) = tokio::join!(
            f.sessions.login(&["alice"], "secret123"),
            f.sessions.login(&["alice"], "secret123"),
        );
        let (_, a) = a?;
        let (_, b) = b?;

        let a = f.sessions.refresh(Some(&a.refresh_token)).await;
        let b = f.sessions.refresh(Some(&b.refresh_token)).await;
        assert!(a.is_ok() != b.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn change_password_keeps_session() -> anyhow::Result<()> {
        let f = fixture().await?;
        let (_, pair) = f.sessions.login(&["alice"], "secret123").await?;

        let result = f.sessions.change_password(f.user_id, "wrong", "newsecret456").await;
        assert_eq!(kind(result), Some(ErrorKind::InvalidCredential));

        f.sessions
            .change_password(f.user_id, "secret123", "newsecret456")
            .await?;

        let old = f.sessions.login(&["alice"], "secret123").await;
        assert_eq!(kind(old), Some(ErrorKind::InvalidCredential));

        let stored = f.store.find_refresh_token(f.user_id).await?.flatten();
        assert_eq!(stored.as_deref(), Some(pair.refresh_token.as_str()));

        f.sessions.login(&["alice"], "newsecret456").await?;
        Ok(())
    }

    #[tokio::test]
    async fn closed_store_is_storage_failure() -> anyhow::Result<()> {
        let f = fixture().await?;
        f.store.close();

        let result = f.sessions.login(&["alice"], "secret123").await;
        assert_eq!(kind(result), Some(ErrorKind::StorageFailure));
        Ok(())
    }
}
