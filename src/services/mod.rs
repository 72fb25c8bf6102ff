pub mod access_code;
pub mod authorization;
pub mod clock;
pub mod drop_service;
pub mod error;
pub mod identity;
pub mod reaper;
pub mod record_store;
pub mod worker;
