//! Admin month view: per-room, per-day occupancy maps and the block
//! toggles submitted against them.

use crate::core::ledger::Ledger;
use crate::errors::{AppError, AppResult};
use crate::models::Room;
use crate::utils::date::{all_days_of_month, format_date, month_bounds, next_month, parse_date, previous_month};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Day -> id, where 0 means free.
pub type DayMap = BTreeMap<NaiveDate, i64>;

/// Both maps for one room, as stored in the session between the month view
/// and the toggle submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCalendar {
    pub room: Room,
    /// Day -> reservation id.
    pub reservations: DayMap,
    /// Day -> block (restriction) id.
    pub blocks: DayMap,
}

impl RoomCalendar {
    pub fn is_reserved(&self, day: NaiveDate) -> bool {
        self.reservations.get(&day).copied().unwrap_or(0) > 0
    }

    /// The day was part of the month this calendar was built for.
    pub fn shows(&self, day: NaiveDate) -> bool {
        self.reservations.contains_key(&day)
    }

    pub fn block_id(&self, day: NaiveDate) -> i64 {
        self.blocks.get(&day).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub days_in_month: u32,
    pub previous: (i32, u32),
    pub next: (i32, u32),
    pub rooms: Vec<RoomCalendar>,
}

impl MonthView {
    /// Navigation strings as the calendar page expects them (`"03"`,
    /// `"2050"`).
    pub fn navigation(&self) -> BTreeMap<String, String> {
        let mut m = BTreeMap::new();
        m.insert("thisMonth".into(), format!("{:02}", self.month));
        m.insert("thisMonthYear".into(), self.year.to_string());
        m.insert("lastMonth".into(), format!("{:02}", self.previous.1));
        m.insert("lastMonthYear".into(), self.previous.0.to_string());
        m.insert("nextMonth".into(), format!("{:02}", self.next.1));
        m.insert("nextMonthYear".into(), self.next.0.to_string());
        m
    }
}

/// Build the occupancy maps of `rooms` for one month.
///
/// Every day starts at 0. A reservation restriction marks each of its days
/// that falls inside the month; a block marks its start day only.
pub fn build_month_view(
    ledger: &Ledger,
    year: i32,
    month: u32,
    rooms: &[Room],
) -> AppResult<MonthView> {
    let (first, last) = month_bounds(year, month)
        .ok_or_else(|| AppError::InvalidDate(format!("{}-{:02}", year, month)))?;
    let days = all_days_of_month(year, month);

    let mut out = Vec::with_capacity(rooms.len());
    for room in rooms {
        let mut cal = RoomCalendar {
            room: room.clone(),
            reservations: days.iter().map(|d| (*d, 0)).collect(),
            blocks: days.iter().map(|d| (*d, 0)).collect(),
        };

        for r in ledger.restrictions_for_room(room.id, first, last)? {
            match r.reservation_id {
                Some(res_id) => {
                    let from = r.start_date.max(first);
                    let to = r.end_date.min(last);
                    for day in from.iter_days().take_while(|d| *d <= to) {
                        cal.reservations.insert(day, res_id);
                    }
                }
                None => {
                    if r.start_date >= first && r.start_date <= last {
                        cal.blocks.insert(r.start_date, r.id);
                    }
                }
            }
        }
        out.push(cal);
    }

    Ok(MonthView {
        year,
        month,
        first,
        last,
        days_in_month: last.day(),
        previous: previous_month(year, month),
        next: next_month(year, month),
        rooms: out,
    })
}

pub fn add_block_field(room_id: i64, day: NaiveDate) -> String {
    format!("add_block_{}_{}", room_id, format_date(&day))
}

pub fn remove_block_field(room_id: i64, day: NaiveDate) -> String {
    format!("remove_block_{}_{}", room_id, format_date(&day))
}

/// Parse `add_block_<room>_<YYYY-MM-DD>`.
fn parse_add_block(field: &str) -> Option<(i64, NaiveDate)> {
    let rest = field.strip_prefix("add_block_")?;
    let (room, date) = rest.split_once('_')?;
    Some((room.parse().ok()?, parse_date(date)?))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockEdits {
    /// Block ids to delete.
    pub remove: Vec<i64>,
    /// `(room, day)` pairs to block.
    pub add: Vec<(i64, NaiveDate)>,
    /// Requested blocks dropped because the day carries a reservation.
    pub skipped: Vec<(i64, NaiveDate)>,
}

impl BlockEdits {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty()
    }
}

/// Diff the submitted calendar form against the stashed maps.
///
/// A stashed block whose `remove_block_*` box is no longer ticked is
/// removed. Each `add_block_*` field becomes a new block unless the stashed
/// reservation map shows that day as reserved or the room already has a
/// block there. Days and rooms the stash does not cover are ignored, since
/// nothing is known about their reservations.
pub fn plan_block_edits(
    stashed: &BTreeMap<i64, RoomCalendar>,
    form: &HashMap<String, String>,
) -> BlockEdits {
    let mut edits = BlockEdits::default();

    for (room_id, cal) in stashed {
        for (day, block_id) in &cal.blocks {
            if *block_id > 0 && !form.contains_key(&remove_block_field(*room_id, *day)) {
                edits.remove.push(*block_id);
            }
        }
    }

    let mut requested: Vec<(i64, NaiveDate)> = form
        .keys()
        .filter_map(|k| {
            let parsed = parse_add_block(k);
            if parsed.is_none() && k.starts_with("add_block_") {
                tracing::warn!(field = %k, "ignoring malformed block field");
            }
            parsed
        })
        .collect();
    requested.sort();

    for (room_id, day) in requested {
        match stashed.get(&room_id) {
            Some(cal) if !cal.shows(day) => {
                tracing::warn!(room_id, day = %format_date(&day), "ignoring block outside the shown month");
            }
            Some(cal) if cal.is_reserved(day) => edits.skipped.push((room_id, day)),
            Some(cal) if cal.block_id(day) > 0 => {}
            Some(_) => edits.add.push((room_id, day)),
            None => tracing::warn!(room_id, "ignoring block for a room not on the calendar"),
        }
    }

    edits
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockEditReport {
    pub removed: usize,
    pub added: usize,
    pub skipped: Vec<(i64, NaiveDate)>,
}

/// Plan and apply block toggles. Stops at the first store failure.
pub fn apply_block_edits(
    ledger: &Ledger,
    stashed: &BTreeMap<i64, RoomCalendar>,
    form: &HashMap<String, String>,
) -> AppResult<BlockEditReport> {
    let edits = plan_block_edits(stashed, form);

    for id in &edits.remove {
        ledger.delete_block(*id)?;
    }
    for (room_id, day) in &edits.add {
        ledger.insert_block(*room_id, *day)?;
    }
    for (room_id, day) in &edits.skipped {
        tracing::warn!(room_id, day = %format_date(day), "not blocking a reserved day");
    }

    Ok(BlockEditReport {
        removed: edits.remove.len(),
        added: edits.add.len(),
        skipped: edits.skipped,
    })
}
