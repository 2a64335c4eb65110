use crate::utils::date::ranges_overlap;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Why a room is unavailable (⇔ `restrictions.id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestrictionKind {
    Reservation, // 1
    OwnerBlock,  // 2
}

impl RestrictionKind {
    /// Convert enum → DB id
    pub fn id(&self) -> i64 {
        match self {
            RestrictionKind::Reservation => 1,
            RestrictionKind::OwnerBlock => 2,
        }
    }

    /// Convert DB id → enum
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(RestrictionKind::Reservation),
            2 => Some(RestrictionKind::OwnerBlock),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RestrictionKind::Reservation => "Reservation",
            RestrictionKind::OwnerBlock => "Owner Block",
        }
    }
}

/// One row of the restriction ledger.
///
/// A row with a reservation reference is a guest booking, a row without one
/// is an administrative block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRestriction {
    pub id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i64,
    pub reservation_id: Option<i64>,
    pub kind: RestrictionKind,
    pub created_at: String,
    pub updated_at: String,
}

impl RoomRestriction {
    /// Restriction row for a freshly inserted reservation.
    pub fn for_reservation(
        reservation_id: i64,
        room_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self::new(
            room_id,
            start_date,
            end_date,
            Some(reservation_id),
            RestrictionKind::Reservation,
        )
    }

    /// Single-day owner block.
    pub fn block(room_id: i64, date: NaiveDate) -> Self {
        Self::new(room_id, date, date, None, RestrictionKind::OwnerBlock)
    }

    fn new(
        room_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reservation_id: Option<i64>,
        kind: RestrictionKind,
    ) -> Self {
        let now = Local::now().to_rfc3339();
        Self {
            id: 0,
            start_date,
            end_date,
            room_id,
            reservation_id,
            kind,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_block(&self) -> bool {
        self.reservation_id.is_none()
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        ranges_overlap(self.start_date, self.end_date, start, end)
    }
}
