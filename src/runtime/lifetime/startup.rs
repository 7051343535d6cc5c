use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::blob::{BlobStore, BlobStoreFactory};
use crate::config::StaticConfig;
use crate::services::{ExpirySweeper, LinkService, LinkSettings, SweeperSettings};
use crate::storage::{LinkStore, StorageFactory};

/// Everything a mode needs, built once from the static config
pub struct StartupContext {
    pub store: Arc<dyn LinkStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub link_service: Arc<LinkService>,
    pub sweeper: Arc<ExpirySweeper>,
}

/// 构建存储、文件存储、服务与清理任务
///
/// 清理任务只创建不启动，由调用方决定是否 spawn。
pub async fn prepare_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let store = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", store.backend_name());

    let blobs = BlobStoreFactory::create(&config.blob)
        .await
        .context("Failed to create blob store")?;
    info!("Using blob store: {}", blobs.name());

    let link_service = Arc::new(LinkService::new(
        store.clone(),
        blobs.clone(),
        LinkSettings::from(&config.links),
    ));

    let sweeper = Arc::new(ExpirySweeper::new(
        store.clone(),
        blobs.clone(),
        SweeperSettings::from(&config.sweeper),
    ));

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        store,
        blobs,
        link_service,
        sweeper,
    })
}
