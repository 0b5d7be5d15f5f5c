pub mod designs;
pub mod optimizations;
pub mod projects;
pub mod sessions;
pub mod stock_sheets;
pub mod users;

use chrono::{DateTime, Utc};
use rusqlite::Row;

/// Parses an RFC3339 timestamp column. Stored timestamps are always written
/// by this crate via `to_rfc3339`, so a parse failure indicates a corrupted
/// row rather than a recoverable condition.
pub fn parse_ts(row: &Row, idx: impl rusqlite::RowIndex) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}

pub fn parse_ts_opt(row: &Row, idx: impl rusqlite::RowIndex + Clone) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))),
    }
}

pub fn now_str() -> String {
    Utc::now().to_rfc3339()
}

pub fn ts_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
