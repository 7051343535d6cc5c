use std::sync::{Arc, OnceLock};

use super::StaticConfig;

static CONFIG: OnceLock<Arc<StaticConfig>> = OnceLock::new();

/// Get the process-wide configuration
///
/// Only the bootstrap code reads this; engine components receive their
/// settings explicitly.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| Arc::new(StaticConfig::load(None)))
        .clone()
}

/// Initialize the process-wide configuration
///
/// Loads from `path` (or `linkvault.toml` in the current directory) plus
/// `LV__*` environment overrides. Subsequent calls are no-ops.
///
/// # Examples
/// ```no_run
/// use linkvault::config::init_config;
/// init_config(None);
/// ```
pub fn init_config(path: Option<&str>) -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| Arc::new(StaticConfig::load(path)))
        .clone()
}
