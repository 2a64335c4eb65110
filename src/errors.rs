//! Unified application error type.
//! All modules (db, store, core, web, cli) return AppError to keep the error
//! handling consistent and easy to manage.

use chrono::NaiveDate;
use std::fmt;
use std::io;
use thiserror::Error;

/// Which of the two booking writes failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    Reservation,
    Restriction,
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStep::Reservation => f.write_str("reservation"),
            BookingStep::Restriction => f.write_str("room restriction"),
        }
    }
}

/// Coarse error classes used by the web layer to decide how a failure is
/// shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing form field: re-render the form.
    Validation,
    /// Malformed date or identifier: redirect with a flash notice.
    Parse,
    /// Store read/write failure: redirect with a flash notice.
    Persistence,
    /// Expected session value absent: restart the flow.
    SessionMissing,
    /// Anything else: generic server error.
    Unexpected,
}

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Could not insert {step}: {source}")]
    Booking {
        step: BookingStep,
        #[source]
        source: Box<AppError>,
    },

    #[error("{0} not found")]
    NotFound(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    // ---------------------------
    // Request / flow errors
    // ---------------------------
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Missing session value: {0}")]
    SessionMissing(String),

    #[error("Invalid login credentials")]
    Unauthorized,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    // ---------------------------
    // Collaborators
    // ---------------------------
    #[error("Render error: {0}")]
    Render(String),

    #[error("Server error: {0}")]
    Server(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::InvalidDate(_) | AppError::InvalidId(_) | AppError::InvalidRange { .. } => {
                ErrorKind::Parse
            }
            AppError::Db(_)
            | AppError::Migration(_)
            | AppError::Storage(_)
            | AppError::Booking { .. }
            | AppError::NotFound(_) => ErrorKind::Persistence,
            AppError::SessionMissing(_) => ErrorKind::SessionMissing,
            _ => ErrorKind::Unexpected,
        }
    }

    pub fn booking(step: BookingStep, source: AppError) -> Self {
        AppError::Booking {
            step,
            source: Box::new(source),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
