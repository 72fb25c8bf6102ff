//! In-memory record store

use super::RecordStore;
use crate::models::{FileRecord, FileSummary};
use crate::services::error::{DropError, DropResult};
use crate::services::identity::OwnerIdentity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

struct Slot {
    record: FileRecord,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    records: HashMap<String, Slot>,
    next_seq: u64,
}

/// Records kept in a map behind a single `RwLock`. Not persistent, data is
/// lost on drop.
#[derive(Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<Inner>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, expired or not
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: FileRecord) -> DropResult<()> {
        let mut inner = self.inner.write().await;
        if inner.records.contains_key(&record.id) {
            return Err(DropError::DuplicateId(record.id));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.records.insert(record.id.clone(), Slot { record, seq });
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> DropResult<FileRecord> {
        self.inner
            .read()
            .await
            .records
            .get(id)
            .map(|slot| slot.record.clone())
            .ok_or(DropError::NotFound)
    }

    async fn list_by_owner(&self, owner: &OwnerIdentity) -> DropResult<Vec<FileSummary>> {
        let inner = self.inner.read().await;
        let mut owned: Vec<&Slot> = inner
            .records
            .values()
            .filter(|slot| &slot.record.owner == owner)
            .collect();
        owned.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(owned.into_iter().map(|slot| slot.record.summary()).collect())
    }

    async fn delete_by_id(&self, id: &str) -> DropResult<()> {
        self.inner.write().await.records.remove(id);
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> DropResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.records.len();
        inner
            .records
            .retain(|_, slot| slot.record.created_at > cutoff);
        Ok((before - inner.records.len()) as u64)
    }

    async fn access_code_in_use(&self, owner: &OwnerIdentity, code: &str) -> DropResult<bool> {
        Ok(self
            .inner
            .read()
            .await
            .records
            .values()
            .any(|slot| &slot.record.owner == owner && slot.record.access_code == code))
    }
}
