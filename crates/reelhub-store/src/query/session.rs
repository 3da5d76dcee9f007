//! Session repository for the single refresh credential held by each user.

use std::future::Future;

use jiff::Timestamp;
use uuid::Uuid;

use crate::{StoreClient, StoreResult, TRACING_TARGET_QUERY};

/// Repository for refresh credential operations.
///
/// Each user holds at most one refresh credential. Storing a new one
/// replaces the old one, and clearing it revokes the session.
pub trait SessionRepository {
    /// Replaces the stored refresh credential of a user.
    ///
    /// `None` clears it. Fails with [`StoreError::NotFound`] when the user
    /// does not exist.
    ///
    /// [`StoreError::NotFound`]: crate::StoreError::NotFound
    fn set_refresh_token(
        &self,
        user_id: Uuid,
        refresh_token: Option<String>,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Returns the stored refresh credential of a user.
    ///
    /// The outer `Option` is `None` when the user does not exist.
    fn find_refresh_token(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = StoreResult<Option<Option<String>>>> + Send;

    /// Replaces the stored refresh credential only if it still equals `expected`.
    ///
    /// The comparison and the write happen under one exclusive lock, so of
    /// two concurrent rotations presenting the same credential exactly one
    /// returns `true`.
    fn swap_refresh_token(
        &self,
        user_id: Uuid,
        expected: &str,
        replacement: String,
    ) -> impl Future<Output = StoreResult<bool>> + Send;
}

impl SessionRepository for StoreClient {
    async fn set_refresh_token(
        &self,
        user_id: Uuid,
        refresh_token: Option<String>,
    ) -> StoreResult<()> {
        let mut tables = self.write("set_refresh_token").await?;
        let user = tables.user_mut(user_id)?;

        let revoked = refresh_token.is_none();
        user.refresh_token = refresh_token;
        user.updated_at = Timestamp::now();

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            user_id = %user_id,
            revoked,
            "refresh token replaced"
        );

        Ok(())
    }

    async fn find_refresh_token(&self, user_id: Uuid) -> StoreResult<Option<Option<String>>> {
        let tables = self.read("find_refresh_token").await?;
        Ok(tables
            .users
            .get(&user_id)
            .map(|user| user.refresh_token.clone()))
    }

    async fn swap_refresh_token(
        &self,
        user_id: Uuid,
        expected: &str,
        replacement: String,
    ) -> StoreResult<bool> {
        let mut tables = self.write("swap_refresh_token").await?;
        let user = tables.user_mut(user_id)?;

        if !user.is_current_refresh_token(expected) {
            tracing::debug!(
                target: TRACING_TARGET_QUERY,
                user_id = %user_id,
                "refresh token swap lost"
            );
            return Ok(false);
        }

        user.refresh_token = Some(replacement);
        user.updated_at = Timestamp::now();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use crate::model::NewUser;
    use crate::query::UserRepository;

    async fn setup() -> anyhow::Result<(StoreClient, Uuid)> {
        let store = StoreClient::default();
        let user = store
            .create_user(NewUser {
                username: "alice".into(),
                email: "alice@x.com".into(),
                full_name: "Alice".into(),
                password_hash: "hash".into(),
            })
            .await?;
        Ok((store, user.id))
    }

    #[tokio::test]
    async fn set_and_clear_refresh_token() -> anyhow::Result<()> {
        let (store, user_id) = setup().await?;
        assert_eq!(store.find_refresh_token(user_id).await?, Some(None));

        store.set_refresh_token(user_id, Some("r1".into())).await?;
        assert_eq!(store.find_refresh_token(user_id).await?, Some(Some("r1".into())));

        store.set_refresh_token(user_id, None).await?;
        store.set_refresh_token(user_id, None).await?;
        assert_eq!(store.find_refresh_token(user_id).await?, Some(None));
        Ok(())
    }

    #[tokio::test]
    async fn set_refresh_token_for_missing_user() {
        let store = StoreClient::default();
        let result = store.set_refresh_token(Uuid::now_v7(), None).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn swap_requires_current_value() -> anyhow::Result<()> {
        let (store, user_id) = setup().await?;
        store.set_refresh_token(user_id, Some("r1".into())).await?;

        assert!(store.swap_refresh_token(user_id, "r1", "r2".into()).await?);
        assert!(!store.swap_refresh_token(user_id, "r1", "r3".into()).await?);
        assert_eq!(store.find_refresh_token(user_id).await?, Some(Some("r2".into())));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_swaps_have_one_winner() -> anyhow::Result<()> {
        let (store, user_id) = setup().await?;
        store.set_refresh_token(user_id, Some("r1".into())).await?;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .swap_refresh_token(user_id, "r1", format!("next-{i}"))
                        .await
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await?? {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        Ok(())
    }
}
