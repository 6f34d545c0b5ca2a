//! [`ExpiringStore`] implementations shared across Gatehouse services.
//!
//! Two backends are provided: [`RedisStore`], the production source of
//! truth, and [`MemoryStore`], used by tests and by single-process
//! deployments running without Redis. The [`heartbeat`] module carries the
//! background liveness writer.
//!
//! [`ExpiringStore`]: gatehouse_core::ExpiringStore

pub mod heartbeat;
pub mod memory;
pub mod redis;

pub use heartbeat::spawn_heartbeat_task;
pub use memory::MemoryStore;
pub use redis::RedisStore;
