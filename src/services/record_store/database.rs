use super::RecordStore;
use crate::entities::{drop_files, prelude::*};
use crate::models::{FileRecord, FileSummary};
use crate::services::error::{DropError, DropResult};
use crate::services::identity::OwnerIdentity;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr,
};

/// Record store on a sea-orm connection pool. The pool is opened once and
/// shared for the lifetime of the service.
#[derive(Clone)]
pub struct SeaOrmRecordStore {
    db: DatabaseConnection,
}

impl SeaOrmRecordStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl From<drop_files::Model> for FileRecord {
    fn from(model: drop_files::Model) -> Self {
        FileRecord {
            id: model.id,
            filename: model.filename,
            owner: OwnerIdentity::new(model.owner_identity),
            access_code: model.access_code,
            content: Bytes::from(model.content),
            created_at: model.created_at,
        }
    }
}

#[async_trait]
impl RecordStore for SeaOrmRecordStore {
    async fn insert(&self, record: FileRecord) -> DropResult<()> {
        // Autocommit only: a deferred transaction cannot wait out a busy writer
        let id = record.id.clone();
        let size = record.content.len() as i64;
        let active = drop_files::ActiveModel {
            id: Set(record.id),
            filename: Set(record.filename),
            owner_identity: Set(record.owner.into_inner()),
            access_code: Set(record.access_code),
            content: Set(record.content.to_vec()),
            size: Set(size),
            created_at: Set(record.created_at),
        };

        match DropFiles::insert(active)
            .exec_without_returning(&self.db)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(DropError::DuplicateId(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_id(&self, id: &str) -> DropResult<FileRecord> {
        DropFiles::find_by_id(id)
            .one(&self.db)
            .await?
            .map(FileRecord::from)
            .ok_or(DropError::NotFound)
    }

    async fn list_by_owner(&self, owner: &OwnerIdentity) -> DropResult<Vec<FileSummary>> {
        let summaries = DropFiles::find()
            .select_only()
            .columns([
                drop_files::Column::Id,
                drop_files::Column::Filename,
                drop_files::Column::AccessCode,
                drop_files::Column::Size,
                drop_files::Column::CreatedAt,
            ])
            .filter(drop_files::Column::OwnerIdentity.eq(owner.as_str()))
            .order_by_desc(drop_files::Column::CreatedAt)
            .order_by_desc(drop_files::Column::Id)
            .into_model::<FileSummary>()
            .all(&self.db)
            .await?;

        Ok(summaries)
    }

    async fn delete_by_id(&self, id: &str) -> DropResult<()> {
        DropFiles::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> DropResult<u64> {
        let result = DropFiles::delete_many()
            .filter(drop_files::Column::CreatedAt.lte(cutoff))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn access_code_in_use(&self, owner: &OwnerIdentity, code: &str) -> DropResult<bool> {
        let count = DropFiles::find()
            .filter(drop_files::Column::OwnerIdentity.eq(owner.as_str()))
            .filter(drop_files::Column::AccessCode.eq(code))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}
