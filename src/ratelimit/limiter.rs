//! Core rate limiter implementation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use super::key::CounterKey;
use crate::error::{FloodgateError, Result};
use crate::store::CounterStore;

/// A fixed-capacity, time-windowed rate limit over a shared counter store.
///
/// The limiter holds no counter state of its own; every decision goes
/// through the store's atomic primitives. Any number of tasks, processes,
/// or service instances can therefore enforce one limit together, as long
/// as they share the same backing store.
pub struct RateLimit {
    /// Limit name; namespaces this limiter's keys in the store
    name: String,
    /// Maximum operations allowed per window
    max_requests: u64,
    /// Window length
    period: Duration,
    /// The backing counter store (shared, externally owned)
    store: Arc<dyn CounterStore>,
}

impl RateLimit {
    /// Create a rate limit bound to `store`.
    ///
    /// `period_secs` is the window length in seconds. Fails with
    /// [`FloodgateError::Config`] when `max_requests` or `period_secs`
    /// is zero.
    pub fn new(
        name: impl Into<String>,
        max_requests: u64,
        period_secs: u64,
        store: Arc<dyn CounterStore>,
    ) -> Result<Self> {
        if max_requests == 0 {
            return Err(FloodgateError::Config(
                "max_requests must be greater than zero".to_string(),
            ));
        }
        if period_secs == 0 {
            return Err(FloodgateError::Config(
                "period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            name: name.into(),
            max_requests,
            period: Duration::from_secs(period_secs),
            store,
        })
    }

    /// Get the limit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the window capacity.
    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    /// Get the window length.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Check whether one more operation by `label` is allowed, consuming
    /// one unit of allowance when it is.
    ///
    /// The check is two store calls: initialize the window if absent,
    /// then conditionally decrement. The two need no shared transaction:
    /// initialization never touches a live entry and the decrement never
    /// goes below zero, so the sequence stays correct under any
    /// interleaving of concurrent callers.
    pub async fn check(&self, label: &str) -> Result<bool> {
        let key = CounterKey::new(&self.name, label);
        let storage_key = key.to_storage_key();

        let current = self
            .store
            .init(&storage_key, self.max_requests, self.period)
            .await?;

        trace!(
            key = %key,
            current = current,
            "Checking rate limit"
        );

        match self.store.decrement_if_positive(&storage_key).await? {
            Some(remaining) => {
                trace!(key = %key, remaining = remaining, "Operation allowed");
                Ok(true)
            }
            None => {
                debug!(key = %key, "Rate limit exceeded");
                Ok(false)
            }
        }
    }

    /// Get the number of operations still permitted for `label` in the
    /// current window, without consuming any.
    ///
    /// Purely a query: an absent entry reports full capacity and no
    /// window is started, so expiry timing is unaffected.
    pub async fn allowance(&self, label: &str) -> Result<u64> {
        let key = CounterKey::new(&self.name, label);

        let remaining = self
            .store
            .read(&key.to_storage_key())
            .await?
            .unwrap_or(self.max_requests);

        trace!(key = %key, remaining = remaining, "Queried allowance");
        Ok(remaining)
    }

    /// Remove the counter for `label`, as if its window had just expired.
    pub async fn purge(&self, label: &str) -> Result<()> {
        let key = CounterKey::new(&self.name, label);
        debug!(key = %key, "Purging counter");

        self.store.delete(&key.to_storage_key()).await
    }
}
