//! LinkVault - an ephemeral link engine
//!
//! Publishes short-lived text and file links that expire at a fixed instant,
//! can be limited to a number of views and can require a password.
//!
//! # Architecture
//! - `services`: access evaluation, view accounting, link service, expiry sweeper
//! - `storage`: link record stores (SeaORM backends, in-memory)
//! - `blob`: external file content stores
//! - `config`: static configuration (TOML + `LV__` environment)
//! - `interfaces`: command-line interface
//! - `runtime`: startup wiring, shutdown and execution modes
//! - `system`: logging setup

pub mod blob;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
