//! Read link command

use colored::Colorize;

use super::helpers::format_time;
use crate::interfaces::cli::CliError;
use crate::services::{LinkService, ReadOutcome};
use crate::storage::Payload;

pub async fn read_link(
    service: &LinkService,
    id: String,
    password: Option<String>,
) -> Result<(), CliError> {
    let view = match service.read_link(&id, password.as_deref()).await? {
        ReadOutcome::Granted(view) => view,
        ReadOutcome::Denied(reason) => {
            println!("{} {}", "✗".bold().red(), reason.message().red());
            return Err(CliError::CommandError(format!("Access denied: {}", reason)));
        }
    };

    println!(
        "{} {} ({}, created {}, expires {}, views {})",
        "✓".bold().green(),
        view.id.cyan(),
        view.kind,
        format_time(&view.created_at).dimmed(),
        format_time(&view.expires_at).yellow(),
        view.view_count
    );

    match view.payload {
        Payload::Text { content } => println!("{}", content),
        Payload::File {
            handle,
            original_name,
        } => println!(
            "  {} {} -> {}",
            "File:".bold(),
            original_name.as_deref().unwrap_or("(unnamed)").blue(),
            handle.as_str().dimmed()
        ),
    }

    Ok(())
}
