use crate::db::restrictions::insert_restriction;
use crate::db::{date_column, date_param, now_str};
use crate::errors::{AppError, AppResult, BookingStep};
use crate::models::{Reservation, RoomRestriction};
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_RESERVATIONS: &str = "
    SELECT r.id, r.first_name, r.last_name, r.email, r.phone,
           r.start_date, r.end_date, r.room_id, r.processed,
           r.created_at, r.updated_at, rm.room_name
    FROM reservations r
    LEFT JOIN rooms rm ON rm.id = r.room_id";

fn map_reservation(row: &Row) -> rusqlite::Result<Reservation> {
    Ok(Reservation {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        start_date: date_column(row, "start_date")?,
        end_date: date_column(row, "end_date")?,
        room_id: row.get("room_id")?,
        processed: row.get::<_, i64>("processed")? == 1,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        room_name: row
            .get::<_, Option<String>>("room_name")?
            .unwrap_or_default(),
    })
}

fn query_reservations(conn: &Connection, filter: &str) -> AppResult<Vec<Reservation>> {
    let sql = format!("{SELECT_RESERVATIONS} {filter} ORDER BY r.start_date ASC, r.id ASC");
    let mut stmt = conn.prepare_cached(&sql)?;

    let rows = stmt.query_map([], map_reservation)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn insert_reservation(conn: &Connection, res: &Reservation) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO reservations
            (first_name, last_name, email, phone, start_date, end_date, room_id,
             processed, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            res.first_name,
            res.last_name,
            res.email,
            res.phone,
            date_param(&res.start_date),
            date_param(&res.end_date),
            res.room_id,
            if res.processed { 1 } else { 0 },
            res.created_at,
            res.updated_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a reservation and its restriction row in one transaction.
///
/// Returns `(reservation_id, restriction_id)`. When the restriction insert
/// fails the reservation row is rolled back with it.
pub fn insert_booking(conn: &mut Connection, res: &Reservation) -> AppResult<(i64, i64)> {
    let tx = conn.transaction()?;

    let reservation_id = insert_reservation(&tx, res)
        .map_err(|e| AppError::booking(BookingStep::Reservation, e))?;

    let restriction = RoomRestriction::for_reservation(
        reservation_id,
        res.room_id,
        res.start_date,
        res.end_date,
    );
    let restriction_id = insert_restriction(&tx, &restriction)
        .map_err(|e| AppError::booking(BookingStep::Restriction, e))?;

    tx.commit()?;
    Ok((reservation_id, restriction_id))
}

pub fn all_reservations(conn: &Connection) -> AppResult<Vec<Reservation>> {
    query_reservations(conn, "")
}

/// Reservations not yet processed by an administrator.
pub fn new_reservations(conn: &Connection) -> AppResult<Vec<Reservation>> {
    query_reservations(conn, "WHERE r.processed = 0")
}

pub fn reservation_by_id(conn: &Connection, id: i64) -> AppResult<Reservation> {
    let sql = format!("{SELECT_RESERVATIONS} WHERE r.id = ?1");
    conn.query_row(&sql, [id], map_reservation)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Reservation {}", id)))
}

/// Update the guest details of a reservation. Dates and room are fixed once
/// booked.
pub fn update_reservation(conn: &Connection, res: &Reservation) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE reservations
         SET first_name = ?1, last_name = ?2, email = ?3, phone = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            res.first_name,
            res.last_name,
            res.email,
            res.phone,
            now_str(),
            res.id,
        ],
    )?;
    if n == 0 {
        return Err(AppError::NotFound(format!("Reservation {}", res.id)));
    }
    Ok(())
}

pub fn update_processed(conn: &Connection, id: i64, processed: bool) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE reservations SET processed = ?1, updated_at = ?2 WHERE id = ?3",
        params![if processed { 1 } else { 0 }, now_str(), id],
    )?;
    if n == 0 {
        return Err(AppError::NotFound(format!("Reservation {}", id)));
    }
    Ok(())
}

/// Delete a reservation together with the restriction rows pointing at it.
pub fn delete_reservation(conn: &mut Connection, id: i64) -> AppResult<()> {
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM room_restrictions WHERE reservation_id = ?1", [id])?;
    let n = tx.execute("DELETE FROM reservations WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(AppError::NotFound(format!("Reservation {}", id)));
    }

    tx.commit()?;
    Ok(())
}
