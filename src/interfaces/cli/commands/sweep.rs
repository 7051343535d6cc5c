//! One-shot expiry sweep

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::ExpirySweeper;

pub async fn run_sweep(sweeper: &ExpirySweeper) -> Result<(), CliError> {
    let report = sweeper.run_cycle().await?;

    if report.expired_found == 0 {
        println!("{} No expired links", "ℹ".bold().blue());
        return Ok(());
    }

    println!(
        "{} Removed {} expired links ({} found)",
        "✓".bold().green(),
        report.records_deleted.to_string().green(),
        report.expired_found
    );
    if report.blobs_deleted > 0 || report.blob_failures > 0 {
        println!(
            "  {} {} deleted, {} failed",
            "Blobs:".dimmed(),
            report.blobs_deleted,
            report.blob_failures.to_string().yellow()
        );
    }
    if report.unreadable > 0 {
        println!(
            "  {} {} unreadable rows removed without their blobs",
            "Warning:".yellow(),
            report.unreadable
        );
    }
    Ok(())
}
