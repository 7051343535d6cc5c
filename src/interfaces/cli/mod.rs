//! CLI interface module
//!
//! This module provides command-line interface functionality for linkvault.

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use crate::errors::LinkVaultError;
use crate::runtime::lifetime::startup::prepare_startup;
use commands::{
    config_management, create_link, delete_link, list_links, parse_expiry, read_link, run_sweep,
};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<LinkVaultError> for CliError {
    fn from(err: LinkVaultError) -> Self {
        match err {
            LinkVaultError::DatabaseConfig(_)
            | LinkVaultError::DatabaseConnection(_)
            | LinkVaultError::DatabaseOperation(_)
            | LinkVaultError::BlobStorage(_) => CliError::StorageError(err.to_string()),
            LinkVaultError::Validation(_) | LinkVaultError::InvalidExpiry(_) => {
                CliError::ParseError(err.to_string())
            }
            _ => CliError::CommandError(err.to_string()),
        }
    }
}

/// Run a CLI command from clap-parsed input
///
/// `Daemon` is handled by the caller before this is reached.
pub async fn run_cli_command(cmd: Commands, config: &StaticConfig) -> Result<(), CliError> {
    // Generate doesn't need storage, handle it separately
    if let Commands::Config { action } = cmd {
        let ConfigCommands::Generate { output_path, force } = action;
        return config_management::config_generate(output_path, force).await;
    }

    let ctx = prepare_startup(config)
        .await
        .map_err(|e| CliError::StorageError(format!("{:#}", e)))?;

    match cmd {
        Commands::Create {
            text,
            file,
            expire,
            password,
            max_views,
            owner,
        } => {
            let expiry = expire.as_deref().map(parse_expiry).transpose()?;
            create_link(
                &ctx.link_service,
                text,
                file,
                expiry,
                password,
                max_views,
                owner,
            )
            .await
        }

        Commands::Read { id, password } => read_link(&ctx.link_service, id, password).await,

        Commands::List { owner, json } => list_links(&ctx.link_service, owner, json).await,

        Commands::Delete { id, owner } => delete_link(&ctx.link_service, id, owner).await,

        Commands::Sweep => run_sweep(&ctx.sweeper).await,

        Commands::Daemon => unreachable!("daemon handled in main"),

        Commands::Config { .. } => unreachable!("handled above"),
    }
}
