use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::services::SweeperHandle;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// 等待 Ctrl+C
pub async fn wait_for_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping background tasks...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// Stop the sweeper, letting a cycle already in progress finish
///
/// Returns false when the sweeper did not stop within the timeout.
pub async fn stop_sweeper(handle: SweeperHandle, limit: Duration) -> bool {
    match timeout(limit, handle.shutdown()).await {
        Ok(Ok(())) => {
            info!("Expiry sweeper shut down cleanly");
            true
        }
        Ok(Err(e)) => {
            error!("Expiry sweeper task failed: {}", e);
            true
        }
        Err(_) => {
            error!(
                "Expiry sweeper did not stop within {} seconds",
                limit.as_secs()
            );
            false
        }
    }
}

/// 等待信号后执行所有关闭任务
pub async fn listen_for_shutdown(sweeper: Option<SweeperHandle>) {
    wait_for_signal().await;

    match sweeper {
        Some(handle) => {
            if !stop_sweeper(handle, Duration::from_secs(SHUTDOWN_TIMEOUT_SECS)).await {
                warn!("Forcing exit with sweeper still running");
            }
        }
        None => info!("Expiry sweeper was not running, nothing to stop"),
    }

    info!("Shutdown complete");
}
