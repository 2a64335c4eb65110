pub mod block;
pub mod calendar;
pub mod config;
pub mod db;
pub mod init;
pub mod log;
pub mod reservations;
pub mod reserve;
pub mod room;
pub mod search;
pub mod serve;
pub mod user;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::store::SqliteStore;
use crate::utils::date::parse_date;
use chrono::NaiveDate;
use std::sync::Arc;

/// Open the configured database with the schema brought up to date.
pub(crate) fn open_store(cfg: &Config) -> AppResult<Arc<SqliteStore>> {
    Ok(Arc::new(SqliteStore::open_migrated(&cfg.database)?))
}

pub(crate) fn date_arg(raw: &str) -> AppResult<NaiveDate> {
    parse_date(raw).ok_or_else(|| AppError::InvalidDate(raw.to_string()))
}

/// Parse an arrival/departure pair, rejecting a departure before arrival.
pub(crate) fn range_args(start: &str, end: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let start = date_arg(start)?;
    let end = date_arg(end)?;
    if start > end {
        return Err(AppError::InvalidRange { start, end });
    }
    Ok((start, end))
}
