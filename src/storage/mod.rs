use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStorage;
pub use memory::MemoryStore;
pub use models::{ExpiredBatch, LinkKind, LinkRecord, OwnerId, Payload, ViewCharge};

/// Durable keyed storage for link metadata
///
/// Every mutation goes through one of the atomic primitives below; callers
/// never read-modify-write a record.
#[async_trait]
pub trait LinkStore: Send + Sync {
    fn backend_name(&self) -> &str;

    /// Atomic insert-if-absent keyed on `record.id`.
    /// Fails with `DuplicateId` when the id is taken.
    async fn create(&self, record: &LinkRecord) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<LinkRecord>>;

    /// Increment `view_count` only if the record exists and is below its
    /// stored `max_views` at the moment of the update.
    async fn conditional_increment_view(&self, id: &str) -> Result<ViewCharge>;

    /// Fails with `NotFound` when nothing was deleted.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Rows with `expires_at <= now`, oldest expiry first, at most `limit`.
    /// Undecodable rows count against `limit` and come back as bare ids.
    async fn find_expired(&self, now: DateTime<Utc>, limit: u64) -> Result<ExpiredBatch>;

    /// Returns how many records were actually removed.
    async fn delete_many(&self, ids: &[String]) -> Result<u64>;

    /// Newest first.
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<LinkRecord>>;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<dyn LinkStore>> {
        if config.database_url.starts_with("memory://") {
            return Ok(Arc::new(MemoryStore::new()));
        }

        let storage = SeaOrmStorage::connect(config).await?;
        Ok(Arc::new(storage))
    }
}
