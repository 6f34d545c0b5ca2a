use async_trait::async_trait;
use dashmap::DashMap;
use gatehouse_core::error::StoreError;
use gatehouse_core::store::{ExpiringStore, Result};
use jiff::{SignedDuration, Timestamp};
use std::time::Duration;

/// A stored entry with its expiry deadline.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expire_at: Timestamp,
}

impl Entry {
    fn is_expired(&self) -> bool {
        Timestamp::now() >= self.expire_at
    }
}

/// In-memory implementation of [`ExpiringStore`] using DashMap.
///
/// Expired entries are removed lazily on access. DashMap's sharded locks
/// allow concurrent access to different buckets without blocking, and
/// `remove` is atomic per key, which gives `get_del` its single-consumer
/// guarantee.
///
/// Intended for tests and single-process deployments; state dies with the
/// process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

fn expiry_for(ttl: Duration) -> Result<Timestamp> {
    let ttl = SignedDuration::try_from(ttl)
        .map_err(|e| StoreError::Operation(format!("ttl out of range: {e}")))?;
    Ok(Timestamp::now() + ttl)
}

#[async_trait]
impl ExpiringStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };

        if entry.is_expired() {
            drop(entry);
            self.entries.remove(key);
            return Ok(None);
        }

        Ok(Some(entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let entry = Entry {
            value: value.to_owned(),
            expire_at: expiry_for(ttl)?,
        };
        self.entries.insert(key.to_owned(), entry);
        Ok(())
    }

    async fn get_del(&self, key: &str) -> Result<Option<String>> {
        let Some((_, entry)) = self.entries.remove(key) else {
            return Ok(None);
        };

        if entry.is_expired() {
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let removed = self.entries.remove(key);
        Ok(removed.is_some_and(|(_, entry)| !entry.is_expired()))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let Some(entry) = self.entries.get(key) else {
            return Ok(false);
        };

        if entry.is_expired() {
            drop(entry);
            self.entries.remove(key);
            return Ok(false);
        }

        Ok(true)
    }

    async fn flush_all(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}
