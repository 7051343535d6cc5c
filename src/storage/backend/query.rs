//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::{debug, error, warn};

use super::converters::model_to_record;
use super::{SeaOrmStorage, retry};
use crate::errors::{LinkVaultError, Result};
use crate::storage::{ExpiredBatch, LinkRecord, OwnerId};

use migration::entities::link;

impl SeaOrmStorage {
    pub(super) async fn get_link(&self, id: &str) -> Result<Option<LinkRecord>> {
        let db = &self.db;
        let id_owned = id.to_string();

        let model = retry::with_retry(&format!("get({})", id), self.retry_config, || async {
            link::Entity::find_by_id(&id_owned).one(db).await
        })
        .await
        .map_err(|e| LinkVaultError::database_operation(format!("查询链接失败: {}", e)))?;

        model.map(model_to_record).transpose()
    }

    pub(super) async fn load_expired(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<ExpiredBatch> {
        let models = link::Entity::find()
            .filter(link::Column::ExpiresAt.lte(now))
            .order_by_asc(link::Column::ExpiresAt)
            .order_by_asc(link::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| LinkVaultError::database_operation(format!("查询过期链接失败: {}", e)))?;

        debug!("Found {} expired links (limit {})", models.len(), limit);

        // 无法解析的过期行仍需删除，只保留 id
        let mut batch = ExpiredBatch::default();
        for model in models {
            let id = model.id.clone();
            match model_to_record(model) {
                Ok(record) => batch.records.push(record),
                Err(e) => {
                    warn!("Expired link row '{}' is unreadable, blob skipped: {}", id, e);
                    batch.unreadable.push(id);
                }
            }
        }
        Ok(batch)
    }

    pub(super) async fn load_by_owner(&self, owner: &OwnerId) -> Result<Vec<LinkRecord>> {
        let models = link::Entity::find()
            .filter(link::Column::OwnerId.eq(owner.as_str()))
            .order_by_desc(link::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| LinkVaultError::database_operation(format!("查询用户链接失败: {}", e)))?;

        Ok(convert_models(models))
    }
}

/// 无法解析的行记录错误后跳过，不影响其余结果
fn convert_models(models: Vec<link::Model>) -> Vec<LinkRecord> {
    models
        .into_iter()
        .filter_map(|model| match model_to_record(model) {
            Ok(record) => Some(record),
            Err(e) => {
                error!("Skipping unreadable link row: {}", e);
                None
            }
        })
        .collect()
}
