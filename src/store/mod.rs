//! Counter storage backends.
//!
//! This module defines the storage contract the rate limiter runs against
//! and provides interchangeable implementations:
//!
//! - **Memory**: in-process storage using DashMap (default, single-instance)
//! - **Redis**: distributed storage for multi-instance deployments

mod memory;
mod pool;
mod redis;

pub use memory::MemoryStore;
pub use pool::RedisPool;
pub use self::redis::RedisStore;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Trait for counter storage backends.
///
/// Every operation touches exactly one key and must be atomic on its own.
/// The rate limiter composes these primitives without any cross-call
/// locking, so correctness under concurrent callers rests entirely on the
/// guarantees documented here.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Create the entry with value `initial` and expiry `ttl` if no entry
    /// exists for `key`, and return the entry's current value either way.
    ///
    /// An existing, unexpired entry keeps both its value and its remaining
    /// TTL; repeated calls must never extend the original window.
    async fn init(&self, key: &str, initial: u64, ttl: Duration) -> Result<u64>;

    /// Decrement the entry's value by one, only if it is greater than zero.
    ///
    /// Returns `Some(new_value)` on success, or `None` when the entry is
    /// absent or already at zero. The value never goes below zero, and
    /// callers racing on the last unit are serialized per key so at most
    /// one of them observes success.
    async fn decrement_if_positive(&self, key: &str) -> Result<Option<u64>>;

    /// Return the entry's current value without mutating it, or `None`
    /// when no entry exists.
    async fn read(&self, key: &str) -> Result<Option<u64>>;

    /// Remove the entry unconditionally. Removing a missing entry is not
    /// an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
