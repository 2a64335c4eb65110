use crate::db::rooms::map_room;
use crate::db::{date_column, date_param};
use crate::errors::{AppError, AppResult};
use crate::models::{RestrictionKind, Room, RoomRestriction};
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};

fn map_restriction(row: &Row) -> rusqlite::Result<RoomRestriction> {
    let kind_id: i64 = row.get("restriction_id")?;
    let kind = RestrictionKind::from_id(kind_id).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Integer,
            Box::new(AppError::InvalidId(format!(
                "Invalid restriction kind: {}",
                kind_id
            ))),
        )
    })?;

    Ok(RoomRestriction {
        id: row.get("id")?,
        start_date: date_column(row, "start_date")?,
        end_date: date_column(row, "end_date")?,
        room_id: row.get("room_id")?,
        reservation_id: row.get("reservation_id")?,
        kind,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn insert_restriction(conn: &Connection, r: &RoomRestriction) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO room_restrictions
            (start_date, end_date, room_id, reservation_id, restriction_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            date_param(&r.start_date),
            date_param(&r.end_date),
            r.room_id,
            r.reservation_id,
            r.kind.id(),
            r.created_at,
            r.updated_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a single-day owner block.
pub fn insert_block(conn: &Connection, room_id: i64, date: NaiveDate) -> AppResult<i64> {
    insert_restriction(conn, &RoomRestriction::block(room_id, date))
}

/// Delete an owner block. Reservation restrictions are never touched here.
pub fn delete_block(conn: &Connection, id: i64) -> AppResult<()> {
    let n = conn.execute(
        "DELETE FROM room_restrictions WHERE id = ?1 AND reservation_id IS NULL",
        [id],
    )?;
    if n == 0 {
        return Err(AppError::NotFound(format!("Block {}", id)));
    }
    Ok(())
}

/// Restrictions of `room_id` overlapping `[start, end]` (inclusive).
pub fn restrictions_for_room(
    conn: &Connection,
    room_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<RoomRestriction>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, start_date, end_date, room_id, reservation_id, restriction_id,
                created_at, updated_at
         FROM room_restrictions
         WHERE room_id = ?1 AND start_date <= ?3 AND ?2 <= end_date
         ORDER BY start_date ASC, id ASC",
    )?;

    let rows = stmt.query_map(
        params![room_id, date_param(&start), date_param(&end)],
        map_restriction,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// True iff no restriction of `room_id` overlaps `[start, end]`.
pub fn room_is_available(
    conn: &Connection,
    room_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(id) FROM room_restrictions
         WHERE room_id = ?1 AND start_date <= ?3 AND ?2 <= end_date",
        params![room_id, date_param(&start), date_param(&end)],
        |row| row.get(0),
    )?;
    Ok(count == 0)
}

/// Rooms without any restriction overlapping `[start, end]`, in id order.
pub fn available_rooms(conn: &Connection, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Room>> {
    let mut stmt = conn.prepare_cached(
        "SELECT r.id, r.room_name, r.created_at, r.updated_at
         FROM rooms r
         WHERE r.id NOT IN (
             SELECT rr.room_id FROM room_restrictions rr
             WHERE rr.start_date <= ?2 AND ?1 <= rr.end_date
         )
         ORDER BY r.id ASC",
    )?;

    let rows = stmt.query_map(params![date_param(&start), date_param(&end)], map_room)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
