//! Delete link command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::LinkService;
use crate::storage::OwnerId;

pub async fn delete_link(service: &LinkService, id: String, owner: String) -> Result<(), CliError> {
    service.delete_link(&id, &OwnerId::new(owner)).await?;

    println!("{} Deleted link: {}", "✓".bold().green(), id.cyan());
    Ok(())
}
