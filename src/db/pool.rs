//! SQLite connection wrapper shared by every request.

use crate::errors::{AppError, AppResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

pub struct DbPool {
    conn: Mutex<Connection>,
}

impl DbPool {
    pub fn new(path: &str) -> AppResult<Self> {
        let conn = Connection::open(Path::new(path))?;
        Self::configure(conn)
    }

    /// Private in-memory database, used by tests and throwaway runs.
    pub fn in_memory() -> AppResult<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> AppResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Helper to execute a closure with a mutable connection reference.
    ///
    /// Holds the connection lock for the duration of the closure; every
    /// store call is one short, blocking round trip.
    pub fn with_conn<F, T>(&self, func: F) -> AppResult<T>
    where
        F: FnOnce(&mut Connection) -> AppResult<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Storage("database connection lock poisoned".into()))?;
        func(&mut conn)
    }
}
