use crate::services::identity::OwnerIdentity;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::Serialize;
use utoipa::ToSchema;

/// One stored payload. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub id: String,
    pub filename: String,
    pub owner: OwnerIdentity,
    pub access_code: String,
    pub content: Bytes,
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            id: self.id.clone(),
            filename: self.filename.clone(),
            access_code: self.access_code.clone(),
            size: self.content.len() as i64,
            created_at: self.created_at,
        }
    }
}

/// Listing view of a record, without the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult, ToSchema)]
pub struct FileSummary {
    pub id: String,
    pub filename: String,
    pub access_code: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}
