use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::{Connection, OptionalExtension};
use std::fs;

fn count(conn: &Connection, sql: &str) -> rusqlite::Result<i64> {
    conn.query_row(sql, [], |row| row.get(0))
}

pub fn print_db_info(pool: &DbPool, db_path: &str) -> AppResult<()> {
    println!();

    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    pool.with_conn(|conn| {
        let rooms = count(conn, "SELECT COUNT(*) FROM rooms")?;
        let reservations = count(conn, "SELECT COUNT(*) FROM reservations")?;
        let unprocessed = count(conn, "SELECT COUNT(*) FROM reservations WHERE processed = 0")?;
        let blocks = count(
            conn,
            "SELECT COUNT(*) FROM room_restrictions WHERE reservation_id IS NULL",
        )?;

        println!("{}• Rooms:{} {}{}{}", CYAN, RESET, GREEN, rooms, RESET);
        println!(
            "{}• Reservations:{} {}{}{} ({} new)",
            CYAN, RESET, GREEN, reservations, RESET, unprocessed
        );
        println!("{}• Owner blocks:{} {}{}{}", CYAN, RESET, GREEN, blocks, RESET);

        let first: Option<String> = conn
            .query_row(
                "SELECT start_date FROM reservations ORDER BY start_date ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let last: Option<String> = conn
            .query_row(
                "SELECT end_date FROM reservations ORDER BY end_date DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let none = || format!("{GREY}--{RESET}");
        println!("{}• Booked range:{}", CYAN, RESET);
        println!("    from: {}", first.unwrap_or_else(none));
        println!("    to:   {}", last.unwrap_or_else(none));

        Ok(())
    })?;

    println!();
    Ok(())
}
