//! Subscription repository for channel follow relationships.

use std::future::Future;

use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{ChannelStats, Subscription};
use crate::{StoreClient, StoreResult, TRACING_TARGET_QUERY};

/// Repository for subscription operations.
///
/// Subscribing and unsubscribing are idempotent.
pub trait SubscriptionRepository {
    /// Subscribes `subscriber_id` to the channel of `channel_id`.
    ///
    /// Returns the existing subscription if there already is one.
    fn subscribe(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> impl Future<Output = StoreResult<Subscription>> + Send;

    /// Removes a subscription. Returns whether one existed.
    fn unsubscribe(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Returns the subscription counters of a channel as seen by `viewer_id`.
    fn find_channel_stats(
        &self,
        channel_id: Uuid,
        viewer_id: Uuid,
    ) -> impl Future<Output = StoreResult<ChannelStats>> + Send;
}

impl SubscriptionRepository for StoreClient {
    async fn subscribe(&self, subscriber_id: Uuid, channel_id: Uuid) -> StoreResult<Subscription> {
        let mut tables = self.write("subscribe").await?;
        tables.user_mut(subscriber_id)?;
        tables.user_mut(channel_id)?;

        let subscription = *tables
            .subscriptions
            .entry((subscriber_id, channel_id))
            .or_insert_with(|| Subscription {
                subscriber_id,
                channel_id,
                created_at: Timestamp::now(),
            });

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            subscriber_id = %subscriber_id,
            channel_id = %channel_id,
            "subscribed"
        );

        Ok(subscription)
    }

    async fn unsubscribe(&self, subscriber_id: Uuid, channel_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.write("unsubscribe").await?;
        tables.user_mut(subscriber_id)?;
        tables.user_mut(channel_id)?;

        let removed = tables
            .subscriptions
            .remove(&(subscriber_id, channel_id))
            .is_some();

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            subscriber_id = %subscriber_id,
            channel_id = %channel_id,
            removed,
            "unsubscribed"
        );

        Ok(removed)
    }

    async fn find_channel_stats(&self, channel_id: Uuid, viewer_id: Uuid) -> StoreResult<ChannelStats> {
        let tables = self.read("find_channel_stats").await?;

        let mut stats = ChannelStats::default();
        for (subscriber, channel) in tables.subscriptions.keys() {
            if *channel == channel_id {
                stats.subscriber_count += 1;
                stats.is_subscribed |= *subscriber == viewer_id;
            }
            if *subscriber == channel_id {
                stats.subscribed_to_count += 1;
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use crate::model::NewUser;
    use crate::query::UserRepository;

    async fn create(store: &StoreClient, username: &str) -> anyhow::Result<Uuid> {
        let user = store
            .create_user(NewUser {
                username: username.into(),
                email: format!("{username}@x.com"),
                full_name: username.into(),
                password_hash: "hash".into(),
            })
            .await?;
        Ok(user.id)
    }

    #[tokio::test]
    async fn subscribe_is_idempotent() -> anyhow::Result<()> {
        let store = StoreClient::default();
        let alice = create(&store, "alice").await?;
        let bob = create(&store, "bob").await?;

        let first = store.subscribe(alice, bob).await?;
        let second = store.subscribe(alice, bob).await?;
        assert_eq!(first, second);

        let stats = store.find_channel_stats(bob, alice).await?;
        assert_eq!(stats.subscriber_count, 1);
        assert_eq!(stats.subscribed_to_count, 0);
        assert!(stats.is_subscribed);

        let stats = store.find_channel_stats(alice, bob).await?;
        assert_eq!(stats.subscriber_count, 0);
        assert_eq!(stats.subscribed_to_count, 1);
        assert!(!stats.is_subscribed);
        Ok(())
    }

    #[tokio::test]
    async fn unsubscribe_reports_removal() -> anyhow::Result<()> {
        let store = StoreClient::default();
        let alice = create(&store, "alice").await?;
        let bob = create(&store, "bob").await?;

        store.subscribe(alice, bob).await?;
        assert!(store.unsubscribe(alice, bob).await?);
        assert!(!store.unsubscribe(alice, bob).await?);
        assert_eq!(store.find_channel_stats(bob, alice).await?, ChannelStats::default());
        Ok(())
    }

    #[tokio::test]
    async fn subscribe_to_missing_channel() -> anyhow::Result<()> {
        let store = StoreClient::default();
        let alice = create(&store, "alice").await?;

        let result = store.subscribe(alice, Uuid::now_v7()).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        Ok(())
    }
}
