//! SQLite persistence: schema migrations, row mapping and the queries
//! behind the store adapter.

pub mod initialize;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod reservations;
pub mod restrictions;
pub mod rooms;
pub mod stats;
pub mod users;

use crate::errors::AppError;
use crate::utils::date::{DATE_FORMAT, parse_date};
use chrono::NaiveDate;
use rusqlite::Row;

/// Read a `YYYY-MM-DD` TEXT column.
pub(crate) fn date_column(row: &Row, column: &str) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(column)?;
    parse_date(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDate(raw.clone())),
        )
    })
}

/// Bind value for a date column.
pub(crate) fn date_param(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

pub(crate) fn now_str() -> String {
    chrono::Local::now().to_rfc3339()
}
