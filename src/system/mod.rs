//! System-level modules
//!
//! Process-wide setup that sits outside the link engine.

pub mod logging;

pub use logging::init_logging;
