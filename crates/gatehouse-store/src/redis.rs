use async_trait::async_trait;
use gatehouse_core::error::StoreError;
use gatehouse_core::store::{ExpiringStore, Result};
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default per-operation deadline. Store calls are expected to be
/// low-latency; a backend slower than this is treated as unavailable.
const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(2);

/// A Redis-backed implementation of [`ExpiringStore`].
///
/// Values are stored as plain strings with `SET ... EX` semantics, and
/// single-redemption reads use `GETDEL` so that concurrent consumers race
/// inside Redis rather than in this process. Every operation carries a
/// short fail-fast timeout.
#[derive(Debug, Clone)]
pub struct RedisStore {
    conn: redis::aio::MultiplexedConnection,
    op_timeout: Duration,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StoreError {
    let message = format!("{operation}: {err}");
    if message.to_ascii_lowercase().contains("timed out") {
        StoreError::Timeout(message)
    } else if err.is_io_error() || err.is_connection_refusal() {
        StoreError::Unavailable(message)
    } else {
        StoreError::Operation(message)
    }
}

impl RedisStore {
    /// Creates a Redis store over an existing multiplexed connection.
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self {
            conn,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    /// Creates a Redis store with a custom per-operation timeout.
    pub fn with_timeout(conn: redis::aio::MultiplexedConnection, op_timeout: Duration) -> Self {
        Self { conn, op_timeout }
    }

    /// Connects to Redis and returns a store over the new connection.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::Unavailable(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to redis", e))?;
        Ok(Self::new(conn))
    }

    /// Runs a Redis operation under the configured deadline.
    async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(operation, error = %e, "redis operation failed");
                Err(map_redis_error(operation, e))
            }
            Err(_) => {
                warn!(operation, timeout_ms = self.op_timeout.as_millis() as u64, "redis operation deadline exceeded");
                Err(StoreError::Timeout(format!(
                    "{operation}: deadline of {:?} exceeded",
                    self.op_timeout
                )))
            }
        }
    }
}

#[async_trait]
impl ExpiringStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        trace!(key, "fetching value from redis");
        let mut conn = self.conn.clone();
        let value = self
            .run("failed to fetch value from redis", async move {
                conn.get::<_, Option<String>>(key).await
            })
            .await?;
        if value.is_some() {
            debug!(key, "redis hit");
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        trace!(key, ttl_secs = ttl.as_secs(), "storing value in redis");
        let mut conn = self.conn.clone();
        // SET EX rejects a zero expiry; clamp to the minimum representable.
        let ttl_secs = ttl.as_secs().max(1);
        self.run("failed to write value to redis", async move {
            conn.set_ex::<_, _, ()>(key, value, ttl_secs).await
        })
        .await
    }

    async fn get_del(&self, key: &str) -> Result<Option<String>> {
        trace!(key, "consuming value from redis");
        let mut conn = self.conn.clone();
        self.run("failed to consume value from redis", async move {
            conn.get_del::<_, Option<String>>(key).await
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        trace!(key, "removing value from redis");
        let mut conn = self.conn.clone();
        let removed = self
            .run("failed to delete value from redis", async move {
                conn.del::<_, i64>(key).await
            })
            .await?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        trace!(key, "checking existence in redis");
        let mut conn = self.conn.clone();
        self.run("failed to check existence in redis", async move {
            conn.exists::<_, bool>(key).await
        })
        .await
    }

    async fn flush_all(&self) -> Result<()> {
        debug!("flushing all redis entries");
        let mut conn = self.conn.clone();
        self.run("failed to flush redis", async move {
            redis::cmd("FLUSHALL").query_async::<()>(&mut conn).await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Exercising RedisStore end to end needs a running Redis instance; the
    // in-memory store covers the trait contract in unit tests. Only the
    // pure error mapping is tested here.

    #[test]
    fn io_errors_map_to_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let mapped = map_redis_error("op", redis::RedisError::from(io));
        assert!(matches!(mapped, StoreError::Unavailable(_)));
    }

    #[test]
    fn response_errors_map_to_operation() {
        let err = redis::RedisError::from((
            redis::ErrorKind::Server(redis::ServerErrorKind::ResponseError),
            "boom",
        ));
        let mapped = map_redis_error("op", err);
        assert!(matches!(mapped, StoreError::Operation(_)));
    }

    #[test]
    fn timeout_errors_map_to_timeout() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let mapped = map_redis_error("op", redis::RedisError::from(io));
        assert!(matches!(mapped, StoreError::Timeout(_)));
    }
}
