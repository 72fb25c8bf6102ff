pub mod database;

use crate::config::{DropConfig, StoreBackend};
use crate::services::record_store::{InMemoryRecordStore, RecordStore, SeaOrmRecordStore};
use std::sync::Arc;
use tracing::info;

/// Open the record store selected by configuration
pub async fn setup_store(config: &DropConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            info!("🧠 Record store: in-memory (contents are lost on restart)");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
        StoreBackend::Sqlite => {
            let db = database::setup_database(&config.database_url).await?;
            Ok(Arc::new(SeaOrmRecordStore::new(db)))
        }
    }
}
