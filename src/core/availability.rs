use crate::errors::AppResult;
use crate::models::Room;
use crate::store::AvailabilityStore;
use chrono::NaiveDate;
use std::sync::Arc;

/// Answers "is this room free" questions against the ledger.
///
/// The overlap test runs inside the store as one query per call. Callers
/// reject `start > end` before asking; a single day (`start == end`) is a
/// valid range.
#[derive(Clone)]
pub struct AvailabilityEngine {
    store: Arc<dyn AvailabilityStore>,
}

impl AvailabilityEngine {
    pub fn new(store: Arc<dyn AvailabilityStore>) -> Self {
        Self { store }
    }

    pub fn is_room_available(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<bool> {
        self.store.search_availability_by_room(room_id, start, end)
    }

    /// Every free room, in store order.
    pub fn available_rooms(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Room>> {
        let rooms = self.store.search_availability_for_all_rooms(start, end)?;
        tracing::debug!(count = rooms.len(), "available rooms");
        Ok(rooms)
    }
}
