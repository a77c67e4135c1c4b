//! Redis-backed counter store.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Script;

use super::pool::RedisPool;
use super::CounterStore;
use crate::error::Result;

/// Create the key with a TTL when absent, then report the live value.
/// An existing key keeps both its value and its remaining TTL.
const INIT_SCRIPT: &str = r#"
redis.call("SET", KEYS[1], ARGV[1], "NX", "EX", ARGV[2])
return redis.call("GET", KEYS[1])
"#;

/// Decrement only while positive. Returns the new value, or false when
/// the key is missing or already at zero.
const DECREMENT_SCRIPT: &str = r#"
local value = tonumber(redis.call("GET", KEYS[1]))
if not value or value <= 0 then
    return false
end
return redis.call("DECR", KEYS[1])
"#;

/// Counter store backed by Redis.
///
/// Both mutating primitives run as single server-side Lua scripts, so
/// each one is atomic even with many processes sharing the database.
/// Counters survive process restarts and are shared by every instance
/// pointed at the same server.
pub struct RedisStore {
    pool: RedisPool,
    init: Script,
    decrement: Script,
}

impl RedisStore {
    /// Create a store over a single connection manager.
    pub fn new(manager: ConnectionManager) -> Self {
        Self::with_pool(RedisPool::from_manager(manager))
    }

    /// Create a store that checks connections out of `pool`.
    pub fn with_pool(pool: RedisPool) -> Self {
        Self {
            pool,
            init: Script::new(INIT_SCRIPT),
            decrement: Script::new(DECREMENT_SCRIPT),
        }
    }

    /// Connect to the server at `url`, e.g. `redis://localhost:6379`.
    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self::with_pool(RedisPool::connect(url, 1).await?))
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn init(&self, key: &str, initial: u64, ttl: Duration) -> Result<u64> {
        let mut conn = self.pool.manager();
        let value: u64 = self
            .init
            .key(key)
            .arg(initial)
            .arg(ttl.as_secs())
            .invoke_async(&mut conn)
            .await?;

        Ok(value)
    }

    async fn decrement_if_positive(&self, key: &str) -> Result<Option<u64>> {
        let mut conn = self.pool.manager();
        let value: Option<u64> = self.decrement.key(key).invoke_async(&mut conn).await?;

        Ok(value)
    }

    async fn read(&self, key: &str) -> Result<Option<u64>> {
        let mut conn = self.pool.manager();
        let value: Option<u64> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;

        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.pool.manager();
        let _: () = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;

        Ok(())
    }
}
