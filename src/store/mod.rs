//! Capability traits over the relational store.
//!
//! Request handlers and the booking workflow only see these traits; the
//! SQLite adapter backs the running application and the in-memory store
//! backs the tests.

pub mod memory;
pub mod sqlite;

use crate::errors::AppResult;
use crate::models::{Reservation, Room, RoomRestriction, User};
use chrono::NaiveDate;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub trait RoomStore: Send + Sync {
    fn all_rooms(&self) -> AppResult<Vec<Room>>;
    fn room_by_id(&self, id: i64) -> AppResult<Room>;
    fn insert_room(&self, room_name: &str) -> AppResult<i64>;
}

pub trait AvailabilityStore: Send + Sync {
    /// True iff no restriction of `room_id` overlaps `[start, end]`.
    fn search_availability_by_room(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<bool>;
    /// Every room free for `[start, end]`, in id order.
    fn search_availability_for_all_rooms(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Room>>;
    fn restrictions_for_room(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<RoomRestriction>>;
    fn insert_restriction(&self, restriction: &RoomRestriction) -> AppResult<i64>;
    fn insert_block(&self, room_id: i64, date: NaiveDate) -> AppResult<i64>;
    fn delete_block(&self, id: i64) -> AppResult<()>;
}

pub trait ReservationStore: Send + Sync {
    /// Insert the reservation and its restriction as one unit. Returns the
    /// reservation id and the restriction id.
    fn insert_reservation_with_restriction(
        &self,
        reservation: &Reservation,
    ) -> AppResult<(i64, i64)>;
    fn all_reservations(&self) -> AppResult<Vec<Reservation>>;
    fn new_reservations(&self) -> AppResult<Vec<Reservation>>;
    fn reservation_by_id(&self, id: i64) -> AppResult<Reservation>;
    fn update_reservation(&self, reservation: &Reservation) -> AppResult<()>;
    fn update_processed(&self, id: i64, processed: bool) -> AppResult<()>;
    fn delete_reservation(&self, id: i64) -> AppResult<()>;
}

pub trait UserStore: Send + Sync {
    fn user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    fn user_by_id(&self, id: i64) -> AppResult<User>;
    fn insert_user(&self, user: &User) -> AppResult<i64>;
}
