use crate::db::now_str;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_USERS: &str = "SELECT id, first_name, last_name, email, password, access_level,
                                   created_at, updated_at
                            FROM users";

fn map_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        password: row.get("password")?,
        access_level: row.get("access_level")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn user_by_email(conn: &Connection, email: &str) -> AppResult<Option<User>> {
    let sql = format!("{SELECT_USERS} WHERE email = ?1");
    Ok(conn.query_row(&sql, [email], map_user).optional()?)
}

pub fn user_by_id(conn: &Connection, id: i64) -> AppResult<User> {
    let sql = format!("{SELECT_USERS} WHERE id = ?1");
    conn.query_row(&sql, [id], map_user)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("User {}", id)))
}

/// Insert a user; `user.password` must already be hashed.
pub fn insert_user(conn: &Connection, user: &User) -> AppResult<i64> {
    let now = now_str();
    conn.execute(
        "INSERT INTO users
            (first_name, last_name, email, password, access_level, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.first_name,
            user.last_name,
            user.email,
            user.password,
            user.access_level,
            now,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
