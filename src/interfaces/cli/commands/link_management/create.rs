//! Create link command

use std::path::PathBuf;

use bytes::Bytes;
use colored::Colorize;

use super::helpers::format_time;
use crate::interfaces::cli::CliError;
use crate::services::{CreateLinkRequest, ExpirySpec, LinkService, NewContent};
use crate::storage::OwnerId;

pub async fn create_link(
    service: &LinkService,
    text: Option<String>,
    file: Option<PathBuf>,
    expiry: Option<ExpirySpec>,
    password: Option<String>,
    max_views: Option<u64>,
    owner: Option<String>,
) -> Result<(), CliError> {
    let content = match (text, file) {
        (_, Some(path)) => {
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                CliError::CommandError(format!("Failed to read {}: {}", path.display(), e))
            })?;
            let original_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            NewContent::File {
                bytes: Bytes::from(bytes),
                original_name,
            }
        }
        (Some(text), None) => NewContent::Text(text),
        (None, None) => {
            return Err(CliError::ParseError(
                "Either text or --file is required".to_string(),
            ));
        }
    };

    let protected = password.as_deref().is_some_and(|p| !p.is_empty());
    let result = service
        .create_link(CreateLinkRequest {
            content,
            expiry,
            password,
            max_views,
            owner: owner.map(OwnerId::new),
        })
        .await?;

    println!(
        "{} Created link: {} (expires: {})",
        "✓".bold().green(),
        result.id.cyan(),
        format_time(&result.expires_at).yellow()
    );
    if let Some(max) = max_views {
        println!("  {} {}", "Max views:".dimmed(), max.to_string().magenta());
    }
    if protected {
        println!("  {} password protected", "🔒".blue());
    }

    Ok(())
}
