//! In-process link store
//!
//! DashMap locks one shard per key operation, which is enough to make
//! insert-if-absent and the conditional view increment atomic per id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use super::{ExpiredBatch, LinkRecord, LinkStore, OwnerId, ViewCharge};
use crate::errors::{LinkVaultError, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
    links: DashMap<String, LinkRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn create(&self, record: &LinkRecord) -> Result<()> {
        match self.links.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(LinkVaultError::duplicate_id(format!(
                "Link id '{}' already exists",
                record.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                debug!("Link stored: {}", record.id);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<LinkRecord>> {
        Ok(self.links.get(id).map(|r| r.value().clone()))
    }

    async fn conditional_increment_view(&self, id: &str) -> Result<ViewCharge> {
        let Some(mut entry) = self.links.get_mut(id) else {
            return Ok(ViewCharge::NotFound);
        };

        // 持有分片写锁期间完成检查与自增
        if entry.views_exhausted() {
            return Ok(ViewCharge::LimitReached);
        }
        entry.view_count += 1;
        Ok(ViewCharge::Charged(entry.view_count))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        match self.links.remove(id) {
            Some(_) => {
                info!("Link deleted: {}", id);
                Ok(())
            }
            None => Err(LinkVaultError::not_found(format!("Link '{}' not found", id))),
        }
    }

    async fn find_expired(&self, now: DateTime<Utc>, limit: u64) -> Result<ExpiredBatch> {
        let mut expired: Vec<LinkRecord> = self
            .links
            .iter()
            .filter(|r| r.expires_at <= now)
            .map(|r| r.value().clone())
            .collect();
        expired.sort_by(|a, b| a.expires_at.cmp(&b.expires_at).then(a.id.cmp(&b.id)));
        expired.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(ExpiredBatch {
            records: expired,
            unreadable: Vec::new(),
        })
    }

    async fn delete_many(&self, ids: &[String]) -> Result<u64> {
        let removed = ids
            .iter()
            .filter(|id| self.links.remove(id.as_str()).is_some())
            .count() as u64;
        if removed > 0 {
            info!("Batch deleted {} links", removed);
        }
        Ok(removed)
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<LinkRecord>> {
        let mut owned: Vec<LinkRecord> = self
            .links
            .iter()
            .filter(|r| r.is_owned_by(owner))
            .map(|r| r.value().clone())
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}
