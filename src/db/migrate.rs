use crate::errors::{AppError, AppResult};
use chrono::Local;
use rusqlite::{Connection, OptionalExtension};

/// A schema step. Applied steps are recorded in the `log` table as
/// `migration_applied` rows targeting the version string.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20240301_0001_create_rooms",
        description: "Created rooms table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS rooms (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            room_name   TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20240301_0002_create_restrictions",
        description: "Created restrictions table with the two restriction kinds",
        sql: r#"
        CREATE TABLE IF NOT EXISTS restrictions (
            id                INTEGER PRIMARY KEY,
            restriction_name  TEXT NOT NULL,
            created_at        TEXT NOT NULL,
            updated_at        TEXT NOT NULL
        );

        INSERT OR IGNORE INTO restrictions (id, restriction_name, created_at, updated_at)
        VALUES (1, 'Reservation', datetime('now'), datetime('now')),
               (2, 'Owner Block', datetime('now'), datetime('now'));
        "#,
    },
    Migration {
        version: "20240301_0003_create_reservations",
        description: "Created reservations table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS reservations (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name  TEXT NOT NULL,
            last_name   TEXT NOT NULL,
            email       TEXT NOT NULL,
            phone       TEXT NOT NULL DEFAULT '',
            start_date  TEXT NOT NULL,
            end_date    TEXT NOT NULL CHECK(start_date <= end_date),
            room_id     INTEGER NOT NULL REFERENCES rooms(id),
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_reservations_start ON reservations(start_date);
        "#,
    },
    Migration {
        version: "20240301_0004_create_room_restrictions",
        description: "Created room_restrictions table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS room_restrictions (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            start_date      TEXT NOT NULL,
            end_date        TEXT NOT NULL CHECK(start_date <= end_date),
            room_id         INTEGER NOT NULL REFERENCES rooms(id),
            reservation_id  INTEGER REFERENCES reservations(id),
            restriction_id  INTEGER NOT NULL REFERENCES restrictions(id),
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_room_restrictions_room_dates
            ON room_restrictions(room_id, start_date, end_date);
        CREATE INDEX IF NOT EXISTS idx_room_restrictions_reservation
            ON room_restrictions(reservation_id);
        "#,
    },
    Migration {
        version: "20240301_0005_create_users",
        description: "Created users table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name    TEXT NOT NULL,
            last_name     TEXT NOT NULL,
            email         TEXT NOT NULL UNIQUE,
            password      TEXT NOT NULL,
            access_level  INTEGER NOT NULL DEFAULT 1,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20240412_0006_add_processed_flag",
        description: "Added processed flag to reservations",
        sql: r#"
        ALTER TABLE reservations ADD COLUMN processed INTEGER NOT NULL DEFAULT 0;
        "#,
    },
];

/// Ensure that the `log` table exists: it doubles as the migration ledger.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(m.sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;

    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, 'migration_applied', ?2, ?3)",
        rusqlite::params![Local::now().to_rfc3339(), m.version, m.description],
    )?;

    tx.commit()?;
    Ok(())
}

/// Public entry point: run all pending migrations, in order.
///
/// Invoked by db::init_db(). Returns the versions applied by this call.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<Vec<&'static str>> {
    ensure_log_table(conn)?;

    let mut applied = Vec::new();
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }
        apply(conn, m)?;
        tracing::info!(version = m.version, "migration applied");
        applied.push(m.version);
    }

    Ok(applied)
}

/// Versions known to this binary that are not yet applied.
pub fn pending_migrations(conn: &Connection) -> AppResult<Vec<&'static str>> {
    ensure_log_table(conn)?;

    let mut pending = Vec::new();
    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            pending.push(m.version);
        }
    }
    Ok(pending)
}
