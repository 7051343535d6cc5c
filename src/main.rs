use clap::Parser;
use colored::Colorize;

use linkvault::cli::{Cli, Commands};
use linkvault::config::init_config;
use linkvault::runtime::modes;
use linkvault::system::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = init_config(cli.config.as_deref());

    match cli.command.unwrap_or(Commands::Daemon) {
        Commands::Daemon => {
            // guard 必须存活到进程结束
            let _guard = init_logging(&config.logging)?;
            modes::run_daemon(&config).await
        }
        cmd => {
            if let Err(e) = modes::run_cli(cmd, &config).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
