use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A mutex that locks per key (here: per owner identity), so that callers of
/// different owners never wait on each other.
#[derive(Debug, Clone)]
pub struct KeyedMutex {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedMutex {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Acquires the lock for `key`. Released when the guard is dropped.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();

        mutex.lock_owned().await
    }

    /// Drops locks nobody holds or waits on.
    pub fn cleanup(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
        before - self.locks.len()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Default for KeyedMutex {
    fn default() -> Self {
        Self::new()
    }
}
