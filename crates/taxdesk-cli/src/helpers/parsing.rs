//! Parsing helpers for dates, amounts, toggles, and file types.

use std::path::Path;

use chrono::NaiveDate;

use crate::errors::CliError;

/// Parse a calendar date (YYYY-MM-DD).
pub fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        CliError::invalid_input(format!("Invalid date (expected YYYY-MM-DD): {}", value)).into()
    })
}

/// Parse a dollar amount. A leading `$` and thousands separators are accepted.
pub fn parse_amount(value: &str) -> anyhow::Result<f64> {
    let cleaned: String = value
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let amount: f64 = cleaned
        .parse()
        .map_err(|_| CliError::invalid_input(format!("Invalid amount: {}", value)))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(CliError::invalid_input(format!("Amount must be zero or more: {}", value)).into());
    }
    Ok(amount)
}

/// Parse an on/off toggle.
pub fn parse_on_off(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" | "enable" | "enabled" => Ok(true),
        "off" | "false" | "no" | "0" | "disable" | "disabled" => Ok(false),
        _ => Err(CliError::invalid_input(format!("Expected on or off, got: {}", value)).into()),
    }
}

/// Parse a display timezone. Empty or `auto` means UTC.
pub fn parse_timezone(value: &str) -> anyhow::Result<Option<String>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    let tz = trimmed
        .parse::<chrono_tz::Tz>()
        .map_err(|_| CliError::invalid_input(format!("Invalid timezone: {}", trimmed)))?;
    Ok(Some(tz.to_string()))
}

/// Guess a MIME type from the file extension.
pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Parse a value with its `FromStr`, mapping failures to invalid input.
pub fn parse_choice<T>(value: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| CliError::invalid_input(e.to_string()).into())
}
