use super::{AvailabilityStore, ReservationStore, RoomStore, UserStore};
use crate::db::log::ttlog_quiet;
use crate::db::pool::DbPool;
use crate::db::{initialize, reservations, restrictions, rooms, users};
use crate::errors::AppResult;
use crate::models::{Reservation, Room, RoomRestriction, User};
use crate::utils::date::format_date;
use chrono::NaiveDate;

/// SQLite adapter for every store capability.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn open(path: &str) -> AppResult<Self> {
        Ok(Self {
            pool: DbPool::new(path)?,
        })
    }

    pub fn in_memory() -> AppResult<Self> {
        Ok(Self {
            pool: DbPool::in_memory()?,
        })
    }

    /// Open and bring the schema up to date in one go.
    pub fn open_migrated(path: &str) -> AppResult<Self> {
        let store = Self::open(path)?;
        store.migrate()?;
        Ok(store)
    }

    pub fn migrate(&self) -> AppResult<Vec<&'static str>> {
        self.pool.with_conn(|conn| initialize::init_db(conn))
    }
}

impl RoomStore for SqliteStore {
    fn all_rooms(&self) -> AppResult<Vec<Room>> {
        self.pool.with_conn(|conn| rooms::all_rooms(conn))
    }

    fn room_by_id(&self, id: i64) -> AppResult<Room> {
        self.pool.with_conn(|conn| rooms::room_by_id(conn, id))
    }

    fn insert_room(&self, room_name: &str) -> AppResult<i64> {
        self.pool.with_conn(|conn| {
            let id = rooms::insert_room(conn, room_name)?;
            ttlog_quiet(conn, "room_add", &id.to_string(), room_name);
            Ok(id)
        })
    }
}

impl AvailabilityStore for SqliteStore {
    fn search_availability_by_room(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<bool> {
        self.pool
            .with_conn(|conn| restrictions::room_is_available(conn, room_id, start, end))
    }

    fn search_availability_for_all_rooms(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Room>> {
        self.pool
            .with_conn(|conn| restrictions::available_rooms(conn, start, end))
    }

    fn restrictions_for_room(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<RoomRestriction>> {
        self.pool
            .with_conn(|conn| restrictions::restrictions_for_room(conn, room_id, start, end))
    }

    fn insert_restriction(&self, restriction: &RoomRestriction) -> AppResult<i64> {
        self.pool
            .with_conn(|conn| restrictions::insert_restriction(conn, restriction))
    }

    fn insert_block(&self, room_id: i64, date: NaiveDate) -> AppResult<i64> {
        self.pool.with_conn(|conn| {
            let id = restrictions::insert_block(conn, room_id, date)?;
            ttlog_quiet(
                conn,
                "block_add",
                &id.to_string(),
                &format!("Blocked room {} on {}", room_id, format_date(&date)),
            );
            Ok(id)
        })
    }

    fn delete_block(&self, id: i64) -> AppResult<()> {
        self.pool.with_conn(|conn| {
            restrictions::delete_block(conn, id)?;
            ttlog_quiet(conn, "block_del", &id.to_string(), "Removed owner block");
            Ok(())
        })
    }
}

impl ReservationStore for SqliteStore {
    fn insert_reservation_with_restriction(
        &self,
        reservation: &Reservation,
    ) -> AppResult<(i64, i64)> {
        self.pool.with_conn(|conn| {
            let ids = reservations::insert_booking(conn, reservation)?;
            ttlog_quiet(
                conn,
                "reservation_add",
                &ids.0.to_string(),
                &format!(
                    "{} booked room {} from {} to {}",
                    reservation.full_name(),
                    reservation.room_id,
                    reservation.start_str(),
                    reservation.end_str()
                ),
            );
            Ok(ids)
        })
    }

    fn all_reservations(&self) -> AppResult<Vec<Reservation>> {
        self.pool.with_conn(|conn| reservations::all_reservations(conn))
    }

    fn new_reservations(&self) -> AppResult<Vec<Reservation>> {
        self.pool.with_conn(|conn| reservations::new_reservations(conn))
    }

    fn reservation_by_id(&self, id: i64) -> AppResult<Reservation> {
        self.pool
            .with_conn(|conn| reservations::reservation_by_id(conn, id))
    }

    fn update_reservation(&self, reservation: &Reservation) -> AppResult<()> {
        self.pool.with_conn(|conn| {
            reservations::update_reservation(conn, reservation)?;
            ttlog_quiet(
                conn,
                "reservation_edit",
                &reservation.id.to_string(),
                "Updated guest details",
            );
            Ok(())
        })
    }

    fn update_processed(&self, id: i64, processed: bool) -> AppResult<()> {
        self.pool.with_conn(|conn| {
            reservations::update_processed(conn, id, processed)?;
            ttlog_quiet(
                conn,
                "reservation_process",
                &id.to_string(),
                &format!("processed = {}", processed),
            );
            Ok(())
        })
    }

    fn delete_reservation(&self, id: i64) -> AppResult<()> {
        self.pool.with_conn(|conn| {
            reservations::delete_reservation(conn, id)?;
            ttlog_quiet(
                conn,
                "reservation_del",
                &id.to_string(),
                "Deleted reservation and its restrictions",
            );
            Ok(())
        })
    }
}

impl UserStore for SqliteStore {
    fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.pool.with_conn(|conn| users::user_by_email(conn, email))
    }

    fn user_by_id(&self, id: i64) -> AppResult<User> {
        self.pool.with_conn(|conn| users::user_by_id(conn, id))
    }

    fn insert_user(&self, user: &User) -> AppResult<i64> {
        self.pool.with_conn(|conn| {
            let id = users::insert_user(conn, user)?;
            ttlog_quiet(conn, "user_add", &id.to_string(), &user.email);
            Ok(id)
        })
    }
}
