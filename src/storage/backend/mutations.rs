//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, ExprTrait, QueryFilter, QuerySelect, SqlErr,
    TransactionTrait,
};
use tracing::{debug, info};

use super::converters::record_to_active_model;
use super::{SeaOrmStorage, retry};
use crate::errors::{LinkVaultError, Result};
use crate::storage::{LinkRecord, ViewCharge};

use migration::entities::link;

/// IN (...) 参数分批大小，避开各数据库的绑定参数上限
const DELETE_CHUNK_SIZE: usize = 500;

impl SeaOrmStorage {
    pub(super) async fn insert_link(&self, record: &LinkRecord) -> Result<()> {
        let db = &self.db;

        let result = retry::with_retry(
            &format!("create({})", record.id),
            self.retry_config,
            || async {
                link::Entity::insert(record_to_active_model(record))
                    .exec(db)
                    .await
            },
        )
        .await;

        match result {
            Ok(_) => {
                debug!("Link stored: {}", record.id);
                Ok(())
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(LinkVaultError::duplicate_id(format!(
                    "Link id '{}' already exists",
                    record.id
                )))
            }
            Err(e) => Err(LinkVaultError::database_operation(format!(
                "创建链接 '{}' 失败: {}",
                record.id, e
            ))),
        }
    }

    /// 单条条件 UPDATE 完成检查与自增：
    /// `view_count = view_count + 1 WHERE id = ? AND (max_views IS NULL OR max_views <= 0 OR view_count < max_views)`
    ///
    /// 非正数的 max_views 与读取路径一致，按未设置处理
    pub(super) async fn increment_view(&self, id: &str) -> Result<ViewCharge> {
        let db = &self.db;
        let id_owned = id.to_string();

        let charged: Option<i64> = retry::with_retry(
            &format!("increment_view({})", id),
            self.retry_config,
            || async {
                let txn = db.begin().await?;

                let updated = link::Entity::update_many()
                    .col_expr(
                        link::Column::ViewCount,
                        Expr::col(link::Column::ViewCount).add(Expr::val(1i64)),
                    )
                    .filter(link::Column::Id.eq(id_owned.as_str()))
                    .filter(
                        Condition::any()
                            .add(link::Column::MaxViews.is_null())
                            .add(link::Column::MaxViews.lte(0i64))
                            .add(
                                Expr::col(link::Column::ViewCount)
                                    .lt(Expr::col(link::Column::MaxViews)),
                            ),
                    )
                    .exec(&txn)
                    .await?;

                if updated.rows_affected == 0 {
                    txn.rollback().await?;
                    return Ok(None);
                }

                // 同一事务内读回，行锁保证读到的是本次自增后的值
                let count: Option<i64> = link::Entity::find_by_id(id_owned.as_str())
                    .select_only()
                    .column(link::Column::ViewCount)
                    .into_tuple()
                    .one(&txn)
                    .await?;

                txn.commit().await?;
                Ok(count)
            },
        )
        .await
        .map_err(|e| LinkVaultError::database_operation(format!("更新浏览次数失败: {}", e)))?;

        if let Some(count) = charged {
            return Ok(ViewCharge::Charged(u64::try_from(count).unwrap_or(0)));
        }

        // 未命中：区分链接不存在与已达上限
        match self.get_link(id).await? {
            Some(_) => Ok(ViewCharge::LimitReached),
            None => Ok(ViewCharge::NotFound),
        }
    }

    pub(super) async fn remove(&self, id: &str) -> Result<()> {
        let db = &self.db;
        let id_owned = id.to_string();

        let result = retry::with_retry(&format!("remove({})", id), self.retry_config, || async {
            link::Entity::delete_by_id(&id_owned).exec(db).await
        })
        .await
        .map_err(|e| LinkVaultError::database_operation(format!("删除链接失败: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(LinkVaultError::not_found(format!("Link '{}' not found", id)));
        }

        info!("Link deleted: {}", id);
        Ok(())
    }

    /// 批量删除链接，返回实际删除的数量
    pub(super) async fn batch_remove(&self, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let db = &self.db;
        let mut total = 0u64;

        for chunk in ids.chunks(DELETE_CHUNK_SIZE) {
            let result = retry::with_retry("batch_remove", self.retry_config, || async {
                link::Entity::delete_many()
                    .filter(link::Column::Id.is_in(chunk.iter().cloned()))
                    .exec(db)
                    .await
            })
            .await
            .map_err(|e| LinkVaultError::database_operation(format!("批量删除失败: {}", e)))?;

            total += result.rows_affected;
        }

        info!("Batch deleted {} links", total);
        Ok(total)
    }
}
