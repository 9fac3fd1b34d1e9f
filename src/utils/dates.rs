use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::api::error::ApiError;

/// Parses a request date. Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS`
/// timestamp or an RFC 3339 timestamp; timestamps keep their UTC calendar day.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc).date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ts.date());
    }

    Err(ApiError::Validation(format!(
        "{field} must be a date in YYYY-MM-DD format"
    )))
}
