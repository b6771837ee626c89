use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use vik_core::error::Result;
use vik_core::time::{Clock, SystemClock};

/// A cached value and the time it was last written.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub inserted_at: DateTime<Utc>,
    pub value: V,
}

/// Side effect run for every entry leaving the cache through a sweep or drain.
#[async_trait]
pub trait ExpireHandler<K, V>: Send + Sync {
    async fn expire(&self, key: K, value: V) -> Result<()>;
}

/// Key/value store whose entries expire `delay` after their last write.
///
/// Reads never refresh an entry. Expired entries stay until a sweep removes
/// them. The internal lock is never held while an [`ExpireHandler`] runs, so
/// handlers may use the cache themselves.
pub struct ExpiringCache<K, V> {
    delay: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(delay: Duration) -> Self {
        Self::with_clock(delay, Arc::new(SystemClock))
    }

    pub fn with_clock(delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            delay,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Inserts or overwrites `key`, restarting its expiry. Returns the
    /// previous value.
    pub fn set(&self, key: K, value: V) -> Option<V> {
        let entry = CacheEntry {
            inserted_at: self.clock.now(),
            value,
        };
        self.lock().insert(key, entry).map(|old| old.value)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).map(|entry| entry.value.clone())
    }

    pub fn inserted_at(&self, key: &K) -> Option<DateTime<Utc>> {
        self.lock().get(key).map(|entry| entry.inserted_at)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.lock().contains_key(key)
    }

    /// Removes `key` without running any expire handler.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.lock().remove(key).map(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Evicts every entry with `inserted_at + delay < now` and runs `handler`
    /// for each of them. Returns the number of evicted entries.
    pub async fn sweep(&self, now: DateTime<Utc>, handler: &dyn ExpireHandler<K, V>) -> usize {
        let expired: Vec<(K, V)> = {
            let mut entries = self.lock();
            let keys: Vec<K> = entries
                .iter()
                .filter(|(_, entry)| entry.inserted_at + self.delay < now)
                .map(|(key, _)| key.clone())
                .collect();
            keys.into_iter()
                .filter_map(|key| entries.remove(&key).map(|entry| (key, entry.value)))
                .collect()
        };

        let count = expired.len();
        if count > 0 {
            tracing::debug!(count, "sweeping expired cache entries");
        }
        Self::run_handler(handler, expired).await;
        count
    }

    /// Evicts every entry regardless of age and runs `handler` for each.
    pub async fn drain(&self, handler: &dyn ExpireHandler<K, V>) -> usize {
        let drained: Vec<(K, V)> = self
            .lock()
            .drain()
            .map(|(key, entry)| (key, entry.value))
            .collect();

        let count = drained.len();
        tracing::debug!(count, "draining cache");
        Self::run_handler(handler, drained).await;
        count
    }

    async fn run_handler(handler: &dyn ExpireHandler<K, V>, evicted: Vec<(K, V)>) {
        for (key, value) in evicted {
            let key_repr = format!("{:?}", key);
            if let Err(err) = handler.expire(key, value).await {
                tracing::warn!(key = %key_repr, error = %err, "expire handler failed");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
