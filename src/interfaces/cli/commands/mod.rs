//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

pub mod config_management;
mod link_management;
mod sweep;

pub use link_management::*;
pub use sweep::run_sweep;
