//! The authoritative id → record mapping.
//!
//! Every implementation must make each call atomic with respect to the others:
//! a listing sees either the state before or after a concurrent mutation.

pub mod database;
pub mod memory;

pub use database::SeaOrmRecordStore;
pub use memory::InMemoryRecordStore;

use crate::models::{FileRecord, FileSummary};
use crate::services::error::DropResult;
use crate::services::identity::OwnerIdentity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fails with `DuplicateId` if the id is already present.
    async fn insert(&self, record: FileRecord) -> DropResult<()>;

    async fn get_by_id(&self, id: &str) -> DropResult<FileRecord>;

    /// Most recent first; empty when the owner has nothing stored.
    async fn list_by_owner(&self, owner: &OwnerIdentity) -> DropResult<Vec<FileSummary>>;

    /// Idempotent.
    async fn delete_by_id(&self, id: &str) -> DropResult<()>;

    /// Removes every record created at or before `cutoff`.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> DropResult<u64>;

    /// Whether any stored record of `owner` already uses `code`. Expired
    /// records count until they are reaped.
    async fn access_code_in_use(&self, owner: &OwnerIdentity, code: &str) -> DropResult<bool>;
}
