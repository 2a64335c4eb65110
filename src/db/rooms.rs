use crate::db::now_str;
use crate::errors::{AppError, AppResult};
use crate::models::Room;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub(crate) fn map_room(row: &Row) -> rusqlite::Result<Room> {
    Ok(Room {
        id: row.get("id")?,
        room_name: row.get("room_name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// All rooms in their natural (id) order.
pub fn all_rooms(conn: &Connection) -> AppResult<Vec<Room>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, room_name, created_at, updated_at FROM rooms ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([], map_room)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn room_by_id(conn: &Connection, id: i64) -> AppResult<Room> {
    conn.query_row(
        "SELECT id, room_name, created_at, updated_at FROM rooms WHERE id = ?1",
        [id],
        map_room,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("Room {}", id)))
}

pub fn insert_room(conn: &Connection, room_name: &str) -> AppResult<i64> {
    let now = now_str();
    conn.execute(
        "INSERT INTO rooms (room_name, created_at, updated_at) VALUES (?1, ?2, ?3)",
        params![room_name, now, now],
    )?;
    Ok(conn.last_insert_rowid())
}
