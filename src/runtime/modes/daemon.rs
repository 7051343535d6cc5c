//! Daemon mode
//!
//! Keeps the expiry sweeper running until Ctrl+C.

use anyhow::Result;
use tracing::{info, warn};

use crate::config::StaticConfig;
use crate::runtime::lifetime::{shutdown, startup};

pub async fn run_daemon(config: &StaticConfig) -> Result<()> {
    let ctx = startup::prepare_startup(config).await?;

    let handle = if config.sweeper.enabled {
        let settings = ctx.sweeper.settings();
        info!(
            "Expiry sweeper enabled: every {:?}, batch {}, at most {} batches per cycle",
            settings.interval, settings.batch_size, settings.max_batches_per_cycle
        );
        Some(ctx.sweeper.clone().spawn())
    } else {
        warn!("Expiry sweeper disabled; expired links stay in storage until removed");
        None
    };

    info!("linkvault daemon running, press Ctrl+C to stop");
    shutdown::listen_for_shutdown(handle).await;
    Ok(())
}
