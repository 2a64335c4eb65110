//! The restriction ledger: the single source of truth for room occupancy.

use crate::errors::AppResult;
use crate::models::RoomRestriction;
use crate::store::AvailabilityStore;
use crate::utils::date::format_date;
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn AvailabilityStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn AvailabilityStore>) -> Self {
        Self { store }
    }

    pub fn insert_restriction(&self, restriction: &RoomRestriction) -> AppResult<i64> {
        let id = self.store.insert_restriction(restriction)?;
        tracing::debug!(
            id,
            room_id = restriction.room_id,
            kind = restriction.kind.name(),
            "restriction inserted"
        );
        Ok(id)
    }

    /// Single-day owner block on `date`.
    pub fn insert_block(&self, room_id: i64, date: NaiveDate) -> AppResult<i64> {
        let id = self.store.insert_block(room_id, date)?;
        tracing::info!(id, room_id, date = %format_date(&date), "block added");
        Ok(id)
    }

    pub fn delete_block(&self, id: i64) -> AppResult<()> {
        self.store.delete_block(id)?;
        tracing::info!(id, "block removed");
        Ok(())
    }

    /// Restrictions of `room_id` overlapping `[start, end]`, both inclusive.
    pub fn restrictions_for_room(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<RoomRestriction>> {
        self.store.restrictions_for_room(room_id, start, end)
    }
}
