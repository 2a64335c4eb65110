use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A guest booking.
///
/// `id == 0` marks a draft that has not been persisted yet; drafts travel
/// through the session between the availability search and the
/// reservation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub start_date: NaiveDate, // ⇔ reservations.start_date (TEXT "YYYY-MM-DD")
    pub end_date: NaiveDate,   // ⇔ reservations.end_date, inclusive
    pub room_id: i64,
    pub processed: bool,
    pub created_at: String,
    pub updated_at: String,

    /// Joined from `rooms.room_name`; empty when not loaded.
    #[serde(default)]
    pub room_name: String,
}

impl Reservation {
    /// Build an unsaved draft for the given stay.
    pub fn draft(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        let now = Local::now().to_rfc3339();
        Self {
            id: 0,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            start_date,
            end_date,
            room_id: 0,
            processed: false,
            created_at: now.clone(),
            updated_at: now,
            room_name: String::new(),
        }
    }

    pub fn start_str(&self) -> String {
        self.start_date.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end_date.format("%Y-%m-%d").to_string()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
