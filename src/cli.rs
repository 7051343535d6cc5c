//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for linkvault using clap's derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// LinkVault - ephemeral, view-limited, password-protected links
#[derive(Parser)]
#[command(name = "linkvault")]
#[command(version)]
#[command(about = "Ephemeral link engine with expiry, view limits and passwords", long_about = None)]
pub struct Cli {
    /// Configuration file (default: linkvault.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the expiry sweeper until Ctrl+C (default)
    Daemon,

    /// Publish a text or file link
    ///
    /// Usage: create <TEXT> | create --file <PATH>
    Create {
        /// Text content
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,

        /// Upload a file instead of text
        #[arg(long)]
        file: Option<PathBuf>,

        /// Minutes until expiry, or an RFC3339 instant
        #[arg(long)]
        expire: Option<String>,

        /// Password protection
        #[arg(long)]
        password: Option<String>,

        /// Maximum number of successful reads
        #[arg(long)]
        max_views: Option<u64>,

        /// Owner identity
        #[arg(long)]
        owner: Option<String>,
    },

    /// Read a link (charges one view when granted)
    Read {
        /// Link id
        id: String,

        /// Password for protected links
        #[arg(long)]
        password: Option<String>,
    },

    /// List links owned by an identity
    List {
        /// Owner identity
        #[arg(long)]
        owner: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a link as its owner
    Delete {
        /// Link id
        id: String,

        /// Caller identity
        #[arg(long)]
        owner: String,
    },

    /// Run a single expiry sweep cycle
    Sweep,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: linkvault.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}
