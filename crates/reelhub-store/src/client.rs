//! In-process store client.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::model::{Subscription, User, Video};
use crate::{StoreError, StoreResult, TRACING_TARGET_CLIENT};

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct StoreConfig {
    /// Maximum time to wait for the store lock before failing an operation.
    pub lock_timeout: Duration,
}

impl StoreConfig {
    /// Creates a configuration with the given lock timeout.
    pub fn new(lock_timeout: Duration) -> Self {
        Self { lock_timeout }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
        }
    }
}

/// Tables and unique indexes guarded by the store lock.
#[derive(Default)]
pub(crate) struct StoreTables {
    pub(crate) users: HashMap<Uuid, User>,
    /// Normalized username to user id.
    pub(crate) usernames: HashMap<String, Uuid>,
    /// Normalized email to user id.
    pub(crate) emails: HashMap<String, Uuid>,
    pub(crate) videos: HashMap<Uuid, Video>,
    /// Keyed by (subscriber, channel).
    pub(crate) subscriptions: HashMap<(Uuid, Uuid), Subscription>,
}

impl StoreTables {
    pub(crate) fn user_mut(&mut self, user_id: Uuid) -> StoreResult<&mut User> {
        self.users.get_mut(&user_id).ok_or(StoreError::NotFound {
            entity: "user",
            id: user_id,
        })
    }
}

/// Store client shared by every request handler.
///
/// Cloning is cheap; all clones operate on the same tables. Every operation
/// acquires the lock with the configured timeout, and writes are visible to
/// all subsequent reads.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreClientInner>,
}

struct StoreClientInner {
    tables: RwLock<StoreTables>,
    closed: AtomicBool,
    config: StoreConfig,
}

impl StoreClient {
    /// Creates an empty store.
    pub fn new(config: StoreConfig) -> Self {
        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            lock_timeout_ms = config.lock_timeout.as_millis() as u64,
            "initializing store client"
        );

        Self {
            inner: Arc::new(StoreClientInner {
                tables: RwLock::new(StoreTables::default()),
                closed: AtomicBool::new(false),
                config,
            }),
        }
    }

    /// Returns the configuration used to create this client.
    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Closes the store. Every later operation fails with [`StoreError::Unavailable`].
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        tracing::warn!(target: TRACING_TARGET_CLIENT, "store closed");
    }

    /// Returns whether the store has been closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Acquires shared access to the tables.
    pub(crate) async fn read(
        &self,
        operation: &'static str,
    ) -> StoreResult<RwLockReadGuard<'_, StoreTables>> {
        self.ensure_open()?;
        tokio::time::timeout(self.inner.config.lock_timeout, self.inner.tables.read())
            .await
            .map_err(|_| self.timed_out(operation))
    }

    /// Acquires exclusive access to the tables.
    pub(crate) async fn write(
        &self,
        operation: &'static str,
    ) -> StoreResult<RwLockWriteGuard<'_, StoreTables>> {
        self.ensure_open()?;
        tokio::time::timeout(self.inner.config.lock_timeout, self.inner.tables.write())
            .await
            .map_err(|_| self.timed_out(operation))
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.is_closed() {
            return Err(StoreError::Unavailable("store is closed".into()));
        }
        Ok(())
    }

    fn timed_out(&self, operation: &'static str) -> StoreError {
        tracing::error!(
            target: TRACING_TARGET_CLIENT,
            operation,
            lock_timeout_ms = self.inner.config.lock_timeout.as_millis() as u64,
            "store lock acquisition timed out"
        );
        StoreError::Timeout { operation }
    }
}

impl Default for StoreClient {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreClient")
            .field("config", &self.inner.config)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_store_is_empty() -> anyhow::Result<()> {
        let store = StoreClient::default();
        let tables = store.read("tables").await?;

        assert!(tables.users.is_empty());
        assert!(tables.videos.is_empty());
        assert!(tables.subscriptions.is_empty());
        assert!(!store.is_closed());
        Ok(())
    }

    #[tokio::test]
    async fn closed_store_rejects_operations() {
        let store = StoreClient::default();
        store.close();

        assert!(store.is_closed());
        let result = store.read("tables").await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn lock_acquisition_times_out() -> anyhow::Result<()> {
        let store = StoreClient::new(StoreConfig::new(Duration::from_millis(10)));
        let _guard = store.write("hold").await?;

        let result = store.read("status").await;
        assert!(matches!(result, Err(StoreError::Timeout { operation: "status" })));
        Ok(())
    }
}
