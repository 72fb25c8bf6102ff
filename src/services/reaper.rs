use crate::services::error::DropResult;
use crate::services::record_store::RecordStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Removes records older than the retention window.
#[derive(Clone)]
pub struct ExpiryReaper {
    store: Arc<dyn RecordStore>,
    retention: chrono::Duration,
}

impl ExpiryReaper {
    pub fn new(store: Arc<dyn RecordStore>, retention: chrono::Duration) -> Self {
        Self { store, retention }
    }

    pub fn retention(&self) -> chrono::Duration {
        self.retention
    }

    /// Records created at or before this instant are expired at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.retention
    }

    pub fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        created_at <= self.cutoff(now)
    }

    /// Safe to call on every request and concurrently with itself.
    pub async fn reap(&self, now: DateTime<Utc>) -> DropResult<u64> {
        let removed = self.store.delete_older_than(self.cutoff(now)).await?;
        if removed > 0 {
            tracing::info!("🧹 Reaped {} expired file(s)", removed);
        }
        Ok(removed)
    }
}
