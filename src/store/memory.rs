//! In-memory store used by the test-suite.
//!
//! It keeps real rows and answers overlap queries the same way the SQLite
//! adapter does, with a few hard-wired failure triggers:
//!
//! * inserting a reservation for room [`FAIL_RESERVATION_ROOM`] fails;
//! * inserting a restriction for room [`FAIL_RESTRICTION_ROOM`] fails;
//! * availability queries starting on [`FAIL_QUERY_DATE`] fail.

use super::{AvailabilityStore, ReservationStore, RoomStore, UserStore};
use crate::errors::{AppError, AppResult, BookingStep};
use crate::models::{Reservation, Room, RoomRestriction, User};
use chrono::{Local, NaiveDate};
use std::sync::{Mutex, MutexGuard};

pub const FAIL_RESERVATION_ROOM: i64 = 2;
pub const FAIL_RESTRICTION_ROOM: i64 = 200_000;
pub const FAIL_QUERY_DATE: &str = "2060-01-01";

#[derive(Default)]
struct Tables {
    ids: Counters,
    rooms: Vec<Room>,
    reservations: Vec<Reservation>,
    restrictions: Vec<RoomRestriction>,
    users: Vec<User>,
}

/// AUTOINCREMENT stand-in: one past the largest id ever handed out.
fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Default)]
struct Counters {
    room: i64,
    reservation: i64,
    restriction: i64,
    user: i64,
}

impl Tables {
    fn room_name(&self, room_id: i64) -> String {
        self.rooms
            .iter()
            .find(|r| r.id == room_id)
            .map(|r| r.room_name.clone())
            .unwrap_or_default()
    }

    fn is_free(&self, room_id: i64, start: NaiveDate, end: NaiveDate) -> bool {
        !self
            .restrictions
            .iter()
            .any(|r| r.room_id == room_id && r.overlaps(start, end))
    }

    fn push_reservation(&mut self, res: &Reservation) -> AppResult<i64> {
        if res.room_id == FAIL_RESERVATION_ROOM {
            return Err(AppError::Storage(format!(
                "cannot insert reservation for room {}",
                res.room_id
            )));
        }
        let id = next_id(&mut self.ids.reservation);
        let mut row = res.clone();
        row.id = id;
        row.room_name = self.room_name(res.room_id);
        self.reservations.push(row);
        Ok(id)
    }

    fn push_restriction(&mut self, r: &RoomRestriction) -> AppResult<i64> {
        if r.room_id == FAIL_RESTRICTION_ROOM {
            return Err(AppError::Storage(format!(
                "cannot insert restriction for room {}",
                r.room_id
            )));
        }
        let id = next_id(&mut self.ids.restriction);
        let mut row = r.clone();
        row.id = id;
        self.restrictions.push(row);
        Ok(id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with the two standard rooms (ids 1 and 2).
    pub fn with_default_rooms() -> Self {
        let store = Self::new();
        if let Ok(mut t) = store.tables.lock() {
            for name in ["General's Quarters", "Major's Suite"] {
                let id = next_id(&mut t.ids.room);
                t.rooms.push(Room::new(id, name));
            }
        }
        store
    }

    fn tables(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Storage("memory store lock poisoned".into()))
    }

    fn check_query_date(start: NaiveDate) -> AppResult<()> {
        if crate::utils::date::format_date(&start) == FAIL_QUERY_DATE {
            return Err(AppError::Storage(format!(
                "availability query failed for {}",
                FAIL_QUERY_DATE
            )));
        }
        Ok(())
    }
}

impl RoomStore for MemoryStore {
    fn all_rooms(&self) -> AppResult<Vec<Room>> {
        Ok(self.tables()?.rooms.clone())
    }

    fn room_by_id(&self, id: i64) -> AppResult<Room> {
        self.tables()?
            .rooms
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Room {}", id)))
    }

    fn insert_room(&self, room_name: &str) -> AppResult<i64> {
        let mut t = self.tables()?;
        let id = next_id(&mut t.ids.room);
        t.rooms.push(Room::new(id, room_name));
        Ok(id)
    }
}

impl AvailabilityStore for MemoryStore {
    fn search_availability_by_room(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<bool> {
        Self::check_query_date(start)?;
        Ok(self.tables()?.is_free(room_id, start, end))
    }

    fn search_availability_for_all_rooms(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Room>> {
        Self::check_query_date(start)?;
        let t = self.tables()?;
        Ok(t.rooms
            .iter()
            .filter(|r| t.is_free(r.id, start, end))
            .cloned()
            .collect())
    }

    fn restrictions_for_room(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<RoomRestriction>> {
        let t = self.tables()?;
        let mut out: Vec<RoomRestriction> = t
            .restrictions
            .iter()
            .filter(|r| r.room_id == room_id && r.overlaps(start, end))
            .cloned()
            .collect();
        out.sort_by_key(|r| (r.start_date, r.id));
        Ok(out)
    }

    fn insert_restriction(&self, restriction: &RoomRestriction) -> AppResult<i64> {
        self.tables()?.push_restriction(restriction)
    }

    fn insert_block(&self, room_id: i64, date: NaiveDate) -> AppResult<i64> {
        self.tables()?
            .push_restriction(&RoomRestriction::block(room_id, date))
    }

    fn delete_block(&self, id: i64) -> AppResult<()> {
        let mut t = self.tables()?;
        let before = t.restrictions.len();
        t.restrictions.retain(|r| !(r.id == id && r.is_block()));
        if t.restrictions.len() == before {
            return Err(AppError::NotFound(format!("Block {}", id)));
        }
        Ok(())
    }
}

impl ReservationStore for MemoryStore {
    fn insert_reservation_with_restriction(
        &self,
        reservation: &Reservation,
    ) -> AppResult<(i64, i64)> {
        let mut t = self.tables()?;

        let res_id = t
            .push_reservation(reservation)
            .map_err(|e| AppError::booking(BookingStep::Reservation, e))?;

        let restriction = RoomRestriction::for_reservation(
            res_id,
            reservation.room_id,
            reservation.start_date,
            reservation.end_date,
        );
        match t.push_restriction(&restriction) {
            Ok(rr_id) => Ok((res_id, rr_id)),
            Err(e) => {
                t.reservations.retain(|r| r.id != res_id);
                Err(AppError::booking(BookingStep::Restriction, e))
            }
        }
    }

    fn all_reservations(&self) -> AppResult<Vec<Reservation>> {
        let mut out = self.tables()?.reservations.clone();
        out.sort_by_key(|r| (r.start_date, r.id));
        Ok(out)
    }

    fn new_reservations(&self) -> AppResult<Vec<Reservation>> {
        let mut out = self.all_reservations()?;
        out.retain(|r| !r.processed);
        Ok(out)
    }

    fn reservation_by_id(&self, id: i64) -> AppResult<Reservation> {
        self.tables()?
            .reservations
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Reservation {}", id)))
    }

    fn update_reservation(&self, reservation: &Reservation) -> AppResult<()> {
        let mut t = self.tables()?;
        let row = t
            .reservations
            .iter_mut()
            .find(|r| r.id == reservation.id)
            .ok_or_else(|| AppError::NotFound(format!("Reservation {}", reservation.id)))?;
        row.first_name = reservation.first_name.clone();
        row.last_name = reservation.last_name.clone();
        row.email = reservation.email.clone();
        row.phone = reservation.phone.clone();
        row.updated_at = Local::now().to_rfc3339();
        Ok(())
    }

    fn update_processed(&self, id: i64, processed: bool) -> AppResult<()> {
        let mut t = self.tables()?;
        let row = t
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Reservation {}", id)))?;
        row.processed = processed;
        row.updated_at = Local::now().to_rfc3339();
        Ok(())
    }

    fn delete_reservation(&self, id: i64) -> AppResult<()> {
        let mut t = self.tables()?;
        let before = t.reservations.len();
        t.reservations.retain(|r| r.id != id);
        if t.reservations.len() == before {
            return Err(AppError::NotFound(format!("Reservation {}", id)));
        }
        t.restrictions.retain(|r| r.reservation_id != Some(id));
        Ok(())
    }
}

impl UserStore for MemoryStore {
    fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .tables()?
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    fn user_by_id(&self, id: i64) -> AppResult<User> {
        self.tables()?
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {}", id)))
    }

    fn insert_user(&self, user: &User) -> AppResult<i64> {
        let mut t = self.tables()?;
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Validation(format!(
                "a user with email {} already exists",
                user.email
            )));
        }
        let id = next_id(&mut t.ids.user);
        let mut row = user.clone();
        row.id = id;
        t.users.push(row);
        Ok(id)
    }
}
