pub mod activity;
pub mod link;
pub mod participant;
pub mod trip;

use chrono::{DateTime, NaiveDateTime};

use crate::error::AppError;

const MINUTE_PRECISION: &str = "%Y-%m-%dT%H:%M";
const MINUTE_PRECISION_WITH_OFFSET: &str = "%Y-%m-%dT%H:%M%#z";

/// Parses an ISO-8601 date-time; seconds are optional. Offset-carrying inputs
/// keep their local wall-clock time.
pub fn parse_timestamp(field: &str, raw: &str) -> Result<NaiveDateTime, AppError> {
    let trimmed = raw.trim();
    if let Ok(naive) = trimmed.parse::<NaiveDateTime>() {
        return Ok(naive);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, MINUTE_PRECISION) {
        return Ok(naive);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_str(trimmed, MINUTE_PRECISION_WITH_OFFSET))
        .map(|dt| dt.naive_local())
        .map_err(|_| AppError::bad_request(format!("{field} is not a valid ISO-8601 date-time")))
}

pub(crate) fn require_text(field: &str, raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
