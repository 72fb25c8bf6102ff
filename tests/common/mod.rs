#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rust_file_drop::config::DropConfig;
use rust_file_drop::infrastructure::database::setup_database;
use rust_file_drop::services::clock::ManualClock;
use rust_file_drop::services::drop_service::DropService;
use rust_file_drop::services::identity::IdentityResolver;
use rust_file_drop::services::record_store::{InMemoryRecordStore, RecordStore, SeaOrmRecordStore};
use std::sync::Arc;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub async fn sqlite_store() -> Arc<SeaOrmRecordStore> {
    let db = setup_database("sqlite::memory:").await.unwrap();
    Arc::new(SeaOrmRecordStore::new(db))
}

pub fn memory_store() -> Arc<InMemoryRecordStore> {
    Arc::new(InMemoryRecordStore::new())
}

pub struct Harness {
    pub service: Arc<DropService>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(store: Arc<dyn RecordStore>, identity: Arc<dyn IdentityResolver>) -> Harness {
    let clock = Arc::new(ManualClock::new(t0()));
    let service = Arc::new(DropService::new(
        store,
        identity,
        clock.clone(),
        &DropConfig::default(),
    ));
    Harness { service, clock }
}

/// Both store backends, labelled for assertion messages
pub async fn all_stores() -> Vec<(&'static str, Arc<dyn RecordStore>)> {
    vec![
        ("memory", memory_store() as Arc<dyn RecordStore>),
        ("sqlite", sqlite_store().await as Arc<dyn RecordStore>),
    ]
}
