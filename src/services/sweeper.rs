//! Expiry sweeper
//!
//! Periodically removes expired links. For each batch the blobs of FILE
//! links are deleted first (failures are logged and skipped), then the
//! metadata of every record in the batch is deleted in one bulk call.
//! A leaked blob is preferred over metadata pointing at missing content.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, timeout};
use tracing::{debug, error, info, trace, warn};

use crate::blob::BlobStore;
use crate::config::SweeperConfig;
use crate::errors::Result;
use crate::storage::LinkStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweeperSettings {
    pub interval: Duration,
    pub batch_size: u64,
    pub max_batches_per_cycle: u32,
    pub blob_delete_timeout: Duration,
}

impl Default for SweeperSettings {
    fn default() -> Self {
        Self::from(&SweeperConfig::default())
    }
}

impl From<&SweeperConfig> for SweeperSettings {
    fn from(config: &SweeperConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs.max(1)),
            batch_size: config.batch_size.max(1),
            max_batches_per_cycle: config.max_batches_per_cycle.max(1),
            blob_delete_timeout: Duration::from_secs(config.blob_delete_timeout_secs.max(1)),
        }
    }
}

/// Counters for one sweep cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub batches: u32,
    pub expired_found: usize,
    pub blobs_deleted: usize,
    pub blob_failures: usize,
    /// Expired rows that could not be decoded; removed without their blobs
    pub unreadable: usize,
    pub records_deleted: u64,
}

pub struct ExpirySweeper {
    store: Arc<dyn LinkStore>,
    blobs: Arc<dyn BlobStore>,
    settings: SweeperSettings,
}

impl ExpirySweeper {
    pub fn new(
        store: Arc<dyn LinkStore>,
        blobs: Arc<dyn BlobStore>,
        settings: SweeperSettings,
    ) -> Self {
        Self {
            store,
            blobs,
            settings,
        }
    }

    pub fn settings(&self) -> &SweeperSettings {
        &self.settings
    }

    /// Run one cycle against the current time
    pub async fn run_cycle(&self) -> Result<SweepReport> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle treating `now` as the current time
    ///
    /// Store errors abort the cycle; the next tick retries. Blob errors never
    /// do.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let mut report = SweepReport::default();

        while report.batches < self.settings.max_batches_per_cycle {
            let expired = self
                .store
                .find_expired(now, self.settings.batch_size)
                .await?;
            if expired.is_empty() {
                break;
            }
            report.batches += 1;
            report.expired_found += expired.len();

            for record in &expired.records {
                let Some(handle) = record.payload.blob_handle() else {
                    continue;
                };
                match timeout(self.settings.blob_delete_timeout, self.blobs.delete(handle)).await {
                    Ok(Ok(())) => report.blobs_deleted += 1,
                    Ok(Err(e)) => {
                        report.blob_failures += 1;
                        warn!(
                            "Failed to delete blob '{}' of expired link '{}': {}",
                            handle, record.id, e
                        );
                    }
                    Err(_) => {
                        report.blob_failures += 1;
                        warn!(
                            "Timed out deleting blob '{}' of expired link '{}'",
                            handle, record.id
                        );
                    }
                }
            }
            report.unreadable += expired.unreadable.len();

            // 按本批收集到的 id 删除，不重新查询
            report.records_deleted += self.store.delete_many(&expired.ids()).await?;

            if (expired.len() as u64) < self.settings.batch_size {
                break;
            }
        }

        if report.expired_found > 0 {
            info!(
                "Expiry sweep: {} expired, {} records deleted, {} blobs deleted, {} blob failures, {} unreadable",
                report.expired_found,
                report.records_deleted,
                report.blobs_deleted,
                report.blob_failures,
                report.unreadable
            );
        } else {
            trace!("Expiry sweep: nothing to do");
        }
        if report.batches == self.settings.max_batches_per_cycle {
            debug!("Expiry sweep hit the batch cap, remaining records wait for the next tick");
        }

        Ok(report)
    }

    /// Start the periodic loop
    ///
    /// The first cycle runs immediately. Dropping the returned handle without
    /// calling [`SweeperHandle::shutdown`] also stops the loop.
    pub fn spawn(self: Arc<Self>) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let period = self.settings.interval;

        let task = tokio::spawn(async move {
            info!("Expiry sweeper started (interval {:?})", period);
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // 正在执行的周期会跑完，关闭信号在下一轮 select 中处理
                        if let Err(e) = self.run_cycle().await {
                            error!("Expiry sweep cycle failed: {}", e);
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Expiry sweeper stopped");
        });

        SweeperHandle { shutdown_tx, task }
    }
}

/// Owner of a running sweeper loop
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the loop and wait for it to exit
    pub async fn shutdown(self) -> Result<()> {
        // 接收端已退出时 send 失败，可忽略
        let _ = self.shutdown_tx.send(true);
        self.task.await?;
        Ok(())
    }
}
