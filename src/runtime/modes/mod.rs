//! Mode routing
//!
//! - Daemon mode (background expiry sweeper), the default
//! - CLI mode (one-shot commands)

pub mod cli;
pub mod daemon;

pub use cli::run_cli;
pub use daemon::run_daemon;
