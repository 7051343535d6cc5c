//! Helper functions for link management CLI commands

use chrono::{DateTime, Utc};

use crate::interfaces::cli::CliError;
use crate::services::ExpirySpec;

/// Parse `--expire`: whole minutes, or an RFC3339 instant
pub fn parse_expiry(input: &str) -> Result<ExpirySpec, CliError> {
    let input = input.trim();
    if let Ok(minutes) = input.parse::<i64>() {
        return Ok(ExpirySpec::InMinutes(minutes));
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| ExpirySpec::At(dt.with_timezone(&Utc)))
        .map_err(|_| {
            CliError::ParseError(format!(
                "Invalid expiry '{}': expected minutes or an RFC3339 time",
                input
            ))
        })
}

pub fn format_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
