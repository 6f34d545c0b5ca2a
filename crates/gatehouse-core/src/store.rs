use crate::error::StoreError;
use async_trait::async_trait;
use std::time::Duration;

/// Type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A string key-value store whose entries expire after a time-to-live.
///
/// This is the single shared collaborator the challenge registry, the
/// candidate pool, and the heartbeat task are built on. A single instance
/// is the source of truth for the whole process; implementations must be
/// cheap to clone and safe to share across request handlers.
#[async_trait]
pub trait ExpiringStore: Send + Sync + 'static {
    /// Fetches the value for `key`.
    ///
    /// Returns `Ok(None)` if the key is absent or its entry has expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any existing entry and
    /// resetting its TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Atomically fetches and removes the value for `key`.
    ///
    /// When several callers race on the same key, at most one observes the
    /// value. The challenge registry relies on this for single-redemption;
    /// a get followed by a delete is not an acceptable implementation.
    async fn get_del(&self, key: &str) -> Result<Option<String>>;

    /// Removes the entry for `key`. Returns `true` if an entry existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Checks whether a live (unexpired) entry exists for `key`.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Removes every entry in the store. Used only by the credential
    /// seeder at startup.
    async fn flush_all(&self) -> Result<()>;
}
