#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use hotelbook::core::workflow::{
    FIELD_EMAIL, FIELD_END, FIELD_FIRST_NAME, FIELD_LAST_NAME, FIELD_PHONE, FIELD_ROOM,
    FIELD_START,
};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn hb() -> Command {
    cargo_bin_cmd!("hotelbook")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_hotelbook.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Initialize the DB and add the two standard rooms (ids 1 and 2)
pub fn init_db_with_rooms(db_path: &str) {
    hb().args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    for name in ["General's Quarters", "Major's Suite"] {
        hb().args(["--db", db_path, "room", "add", name])
            .assert()
            .success();
    }
}

pub fn date(s: &str) -> chrono::NaiveDate {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// A complete reservation form for `room`.
pub fn reservation_fields(room: &str, first_name: &str) -> HashMap<String, String> {
    [
        (FIELD_ROOM, room),
        (FIELD_START, "2050-01-01"),
        (FIELD_END, "2050-01-03"),
        (FIELD_FIRST_NAME, first_name),
        (FIELD_LAST_NAME, "Grenada"),
        (FIELD_EMAIL, "yg@yg.com"),
        (FIELD_PHONE, "222-122-0122"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
