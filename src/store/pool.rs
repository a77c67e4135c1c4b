//! Round-robin pooling of Redis connection managers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::Client;

use crate::error::{FloodgateError, Result};

/// A fixed set of [`ConnectionManager`]s handed out round-robin.
///
/// Each manager multiplexes a single TCP connection, so a small pool
/// spreads load across several. Checkout is a clone of the next manager
/// in line, which is cheap.
pub struct RedisPool {
    managers: Arc<Vec<ConnectionManager>>,
    cursor: AtomicUsize,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("connections", &self.managers.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl RedisPool {
    /// Open `connections` managers against the server at `url`.
    pub async fn connect(url: &str, connections: usize) -> Result<Self> {
        if connections == 0 {
            return Err(FloodgateError::Config(
                "Redis pool requires at least one connection".to_string(),
            ));
        }

        let client = Client::open(url)
            .map_err(|e| FloodgateError::Config(format!("Invalid Redis URL: {e}")))?;

        let mut managers = Vec::with_capacity(connections);
        for _ in 0..connections {
            managers.push(client.get_connection_manager().await?);
        }

        Ok(Self {
            managers: Arc::new(managers),
            cursor: AtomicUsize::new(0),
        })
    }

    /// Wrap an already-connected manager in a single-slot pool.
    pub fn from_manager(manager: ConnectionManager) -> Self {
        Self {
            managers: Arc::new(vec![manager]),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Check out the next manager in line.
    pub(crate) fn manager(&self) -> ConnectionManager {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.managers[index % self.managers.len()].clone()
    }
}

impl Clone for RedisPool {
    fn clone(&self) -> Self {
        Self {
            managers: self.managers.clone(),
            cursor: AtomicUsize::new(0),
        }
    }
}
