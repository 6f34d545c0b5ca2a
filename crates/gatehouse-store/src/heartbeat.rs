//! Background liveness writer.
//!
//! Writes a periodic `alive` marker into the expiry store so external
//! monitoring can tell the process is still running. The task runs on its
//! own schedule, decoupled from request handling, and must never take the
//! process down: store failures are logged and swallowed.

use gatehouse_core::{ExpiringStore, StoreError};
use jiff::Timestamp;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default interval between heartbeat writes.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(600);

/// TTL of each heartbeat entry. Long enough that monitoring can see a few
/// missed beats before the trail goes cold.
const HEARTBEAT_TTL: Duration = Duration::from_secs(8640);

/// Writes one heartbeat entry keyed by the current unix second.
///
/// Returns the key that was written.
pub async fn write_heartbeat<S: ExpiringStore>(store: &S) -> Result<String, StoreError> {
    let key = Timestamp::now().as_second().to_string();
    store.set(&key, "alive", HEARTBEAT_TTL).await?;
    Ok(key)
}

/// Spawns the background heartbeat task.
///
/// The first write happens immediately; subsequent writes follow every
/// `interval`. Returns a `JoinHandle` for the spawned task.
pub fn spawn_heartbeat_task<S: ExpiringStore>(
    store: Arc<S>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match write_heartbeat(store.as_ref()).await {
                Ok(key) => debug!(key, "heartbeat written"),
                Err(e) => warn!(error = %e, "heartbeat write failed, will retry next cycle"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use async_trait::async_trait;
    use gatehouse_core::store::Result;

    #[tokio::test]
    async fn heartbeat_writes_alive_marker() {
        let store = MemoryStore::new();

        let key = write_heartbeat(&store).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some("alive".to_string()));
    }

    /// Store stub whose writes always fail.
    struct DeadStore;

    #[async_trait]
    impl ExpiringStore for DeadStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(StoreError::Unavailable("dead".into()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
            Err(StoreError::Unavailable("dead".into()))
        }

        async fn get_del(&self, _key: &str) -> Result<Option<String>> {
            Err(StoreError::Unavailable("dead".into()))
        }

        async fn delete(&self, _key: &str) -> Result<bool> {
            Err(StoreError::Unavailable("dead".into()))
        }

        async fn exists(&self, _key: &str) -> Result<bool> {
            Err(StoreError::Unavailable("dead".into()))
        }

        async fn flush_all(&self) -> Result<()> {
            Err(StoreError::Unavailable("dead".into()))
        }
    }

    #[tokio::test]
    async fn task_survives_store_failures() {
        let handle = spawn_heartbeat_task(Arc::new(DeadStore), Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }
}
