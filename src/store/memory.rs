//! In-process counter store.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use super::CounterStore;
use crate::error::Result;

/// How often the whole map is swept for entries that expired without ever
/// being touched again.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A counter value together with its expiry deadline.
#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    value: u64,
    expires_at: Instant,
}

impl CounterEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process counter store backed by a concurrent map.
///
/// Entries expire lazily: every operation treats an expired entry as
/// absent, and a periodic sweep removes whatever lazy access misses.
/// Counters live only as long as the process, so this store suits
/// single-instance deployments and tests.
pub struct MemoryStore {
    entries: DashMap<String, CounterEntry>,
    next_sweep: Mutex<Instant>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_sweep: Mutex::new(Instant::now() + SWEEP_INTERVAL),
        }
    }

    /// Get the number of live (unexpired) entries.
    pub fn entry_count(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .count()
    }

    /// Drop expired entries if the sweep interval has elapsed.
    fn maybe_sweep(&self, now: Instant) {
        {
            let mut next_sweep = self.next_sweep.lock();
            if now < *next_sweep {
                return;
            }
            *next_sweep = now + SWEEP_INTERVAL;
        }

        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        debug!(removed = before - self.entries.len(), "Swept expired counters");
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn init(&self, key: &str, initial: u64, ttl: Duration) -> Result<u64> {
        let now = Instant::now();
        self.maybe_sweep(now);

        // The entry guard locks the key's shard, making the
        // check-then-create sequence atomic per key.
        let value = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(CounterEntry {
                        value: initial,
                        expires_at: now + ttl,
                    });
                    initial
                } else {
                    occupied.get().value
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CounterEntry {
                    value: initial,
                    expires_at: now + ttl,
                });
                initial
            }
        };

        Ok(value)
    }

    async fn decrement_if_positive(&self, key: &str) -> Result<Option<u64>> {
        let now = Instant::now();

        let updated = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.remove();
                    None
                } else if occupied.get().value == 0 {
                    None
                } else {
                    let entry = occupied.get_mut();
                    entry.value -= 1;
                    Some(entry.value)
                }
            }
            Entry::Vacant(_) => None,
        };

        Ok(updated)
    }

    async fn read(&self, key: &str) -> Result<Option<u64>> {
        let now = Instant::now();
        let value = self.entries.get(key).and_then(|guard| {
            let entry = *guard;
            (!entry.is_expired(now)).then_some(entry.value)
        });

        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
