//! List links command

use chrono::Utc;
use colored::Colorize;

use super::helpers::format_time;
use crate::interfaces::cli::CliError;
use crate::services::LinkService;
use crate::storage::OwnerId;

pub async fn list_links(service: &LinkService, owner: String, json: bool) -> Result<(), CliError> {
    let links = service.list_links(&OwnerId::new(owner.clone())).await?;

    if json {
        let out = serde_json::to_string_pretty(&links)
            .map_err(|e| CliError::CommandError(format!("Failed to serialize links: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    if links.is_empty() {
        println!("{} No links found for {}", "ℹ".bold().blue(), owner.cyan());
        return Ok(());
    }

    let now = Utc::now();
    println!("{}", "Link list:".bold().green());
    println!();
    for link in &links {
        let mut info_parts = vec![format!("{} [{}]", link.id.cyan(), link.kind())];

        info_parts.push(
            format!("(expires: {})", format_time(&link.expires_at))
                .dimmed()
                .yellow()
                .to_string(),
        );

        let views = match link.max_views {
            Some(max) => format!("(views: {}/{})", link.view_count, max),
            None => format!("(views: {})", link.view_count),
        };
        info_parts.push(views.dimmed().cyan().to_string());

        if link.is_password_protected() {
            info_parts.push("🔒".to_string());
        }
        if !link.is_live(now) {
            info_parts.push("inactive".red().to_string());
        }

        println!("  {}", info_parts.join(" "));
    }
    println!();
    println!(
        "{} Total {} links",
        "ℹ".bold().blue(),
        links.len().to_string().green()
    );
    Ok(())
}
