//! Persistence: key-value backends, typed records and backups

mod backup;
mod db;
mod kv;
mod models;
mod store;

pub use backup::{backup_file_name, BackupData, ImportSummary, BACKUP_VERSION};
pub use db::SqliteStore;
pub use kv::{KeyValueStore, MemoryStore};
pub use models::*;
pub use store::*;
