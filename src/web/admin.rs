//! Back-office pages. Every route here sits behind `require_admin`.

use crate::core::admin::{EditOutcome, ListingSource};
use crate::core::calendar::{RoomCalendar, apply_block_edits, build_month_view};
use crate::errors::AppError;
use crate::registry::AppRegistry;
use crate::render::TemplateData;
use crate::session::{BlockMapKey, ReservationMapKey, Session};
use crate::utils::date::current_month;
use crate::web::error::{WebResult, done, fail_to, fail_with, warn};
use crate::web::handlers::{page, page_with_status};
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

const DASHBOARD: &str = "/admin/dashboard";

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    y: Option<String>,
    m: Option<String>,
}

impl MonthQuery {
    /// Requested month, the current one when none was given.
    fn resolve(&self) -> Result<(i32, u32), AppError> {
        match (self.y.as_deref(), self.m.as_deref()) {
            (None | Some(""), None | Some("")) => Ok(current_month()),
            (Some(y), Some(m)) => {
                let year = y
                    .parse::<i32>()
                    .map_err(|_| AppError::InvalidDate(format!("year '{}'", y)))?;
                let month = m
                    .parse::<u32>()
                    .ok()
                    .filter(|m| (1..=12).contains(m))
                    .ok_or_else(|| AppError::InvalidDate(format!("month '{}'", m)))?;
                Ok((year, month))
            }
            _ => Err(AppError::InvalidDate("year and month go together".into())),
        }
    }
}

fn calendar_path(year: i32, month: u32) -> String {
    format!("/admin/reservations-calendar?y={}&m={:02}", year, month)
}

/// Where to go after acting on a reservation opened from `src`.
fn back_to(src: ListingSource, month: &MonthQuery) -> String {
    match (src, month.resolve()) {
        (ListingSource::Calendar, Ok((y, m))) => calendar_path(y, m),
        _ => src.path().to_string(),
    }
}

fn parse_target(src: &str, id: &str) -> Result<(ListingSource, i64), AppError> {
    let src = src.parse::<ListingSource>()?;
    let id = id
        .parse::<i64>()
        .map_err(|_| AppError::InvalidId(id.to_string()))?;
    Ok((src, id))
}

pub async fn dashboard(State(registry): State<AppRegistry>, session: Session) -> WebResult {
    page(&registry, &session, "admin-dashboard.page", TemplateData::new())
}

pub async fn reservations_new(
    State(registry): State<AppRegistry>,
    session: Session,
) -> WebResult {
    let reservations = match registry.admin().unprocessed() {
        Ok(r) => r,
        Err(e) => return Ok(fail_with(&session, DASHBOARD, &e)),
    };
    page(
        &registry,
        &session,
        "admin-new-reservations.page",
        TemplateData::new().with("reservations", &reservations),
    )
}

pub async fn reservations_all(
    State(registry): State<AppRegistry>,
    session: Session,
) -> WebResult {
    let reservations = match registry.admin().all() {
        Ok(r) => r,
        Err(e) => return Ok(fail_with(&session, DASHBOARD, &e)),
    };
    page(
        &registry,
        &session,
        "admin-all-reservations.page",
        TemplateData::new().with("reservations", &reservations),
    )
}

pub async fn show_reservation(
    State(registry): State<AppRegistry>,
    session: Session,
    Path((src, id)): Path<(String, String)>,
    Query(month): Query<MonthQuery>,
) -> WebResult {
    let (src, id) = match parse_target(&src, &id) {
        Ok(t) => t,
        Err(e) => return Ok(fail_with(&session, DASHBOARD, &e)),
    };
    let reservation = match registry.admin().show(id) {
        Ok(r) => r,
        Err(e) => return Ok(fail_with(&session, &back_to(src, &month), &e)),
    };

    let mut data = TemplateData::new()
        .with("reservation", &reservation)
        .with_string("src", src.as_str())
        .with_form(Default::default());
    if let Ok((y, m)) = month.resolve() {
        data = data
            .with_string("year", y.to_string())
            .with_string("month", format!("{:02}", m));
    }
    page(&registry, &session, "admin-reservations-show.page", data)
}

pub async fn post_reservation(
    State(registry): State<AppRegistry>,
    session: Session,
    Path((src, id)): Path<(String, String)>,
    Form(fields): Form<HashMap<String, String>>,
) -> WebResult {
    let (src, id) = match parse_target(&src, &id) {
        Ok(t) => t,
        Err(e) => return Ok(fail_with(&session, DASHBOARD, &e)),
    };
    let month = MonthQuery {
        y: fields.get("y").cloned(),
        m: fields.get("m").cloned(),
    };
    let to = back_to(src, &month);

    match registry.admin().update(id, fields) {
        Ok(EditOutcome::Saved(_)) => Ok(done(&session, &to, "Changes saved")),
        Ok(EditOutcome::Rejected { form, reservation }) => page_with_status(
            &registry,
            &session,
            "admin-reservations-show.page",
            TemplateData::new()
                .with("reservation", &reservation)
                .with_string("src", src.as_str())
                .with_form(form),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        Err(e) => Ok(fail_with(&session, &to, &e)),
    }
}

pub async fn process_reservation(
    State(registry): State<AppRegistry>,
    session: Session,
    Path((src, id)): Path<(String, String)>,
    Query(month): Query<MonthQuery>,
) -> WebResult {
    let (src, id) = match parse_target(&src, &id) {
        Ok(t) => t,
        Err(e) => return Ok(fail_with(&session, DASHBOARD, &e)),
    };
    let to = back_to(src, &month);
    match registry.admin().mark_processed(id) {
        Ok(()) => Ok(done(&session, &to, "Reservation marked as processed")),
        Err(e) => Ok(fail_with(&session, &to, &e)),
    }
}

pub async fn delete_reservation(
    State(registry): State<AppRegistry>,
    session: Session,
    Path((src, id)): Path<(String, String)>,
    Query(month): Query<MonthQuery>,
) -> WebResult {
    let (src, id) = match parse_target(&src, &id) {
        Ok(t) => t,
        Err(e) => return Ok(fail_with(&session, DASHBOARD, &e)),
    };
    let to = back_to(src, &month);
    match registry.admin().delete(id) {
        Ok(()) => Ok(done(&session, &to, "Reservation deleted")),
        Err(e) => Ok(fail_with(&session, &to, &e)),
    }
}

pub async fn reservations_calendar(
    State(registry): State<AppRegistry>,
    session: Session,
    Query(month): Query<MonthQuery>,
) -> WebResult {
    let (year, month) = match month.resolve() {
        Ok(ym) => ym,
        Err(e) => return Ok(fail_with(&session, DASHBOARD, &e)),
    };
    let rooms = match registry.room_store().all_rooms() {
        Ok(r) => r,
        Err(e) => return Ok(fail_with(&session, DASHBOARD, &e)),
    };
    let view = match build_month_view(registry.ledger(), year, month, &rooms) {
        Ok(v) => v,
        Err(e) => return Ok(fail_with(&session, DASHBOARD, &e)),
    };

    let mut data = TemplateData::new()
        .with("now", view.first)
        .with("rooms", &rooms)
        .with_int("daysInMonth", i64::from(view.days_in_month));
    for (k, v) in view.navigation() {
        data = data.with_string(&k, v);
    }

    for cal in &view.rooms {
        let id = cal.room.id;
        session.put(&BlockMapKey(id), &cal.blocks);
        session.put(&ReservationMapKey(id), &cal.reservations);
        data = data
            .with(&format!("reservation_map_{}", id), &cal.reservations)
            .with(&format!("block_map_{}", id), &cal.blocks);
    }

    page(&registry, &session, "admin-reservations-calendar.page", data)
}

/// Apply the block checkboxes of the calendar page.
pub async fn post_reservations_calendar(
    State(registry): State<AppRegistry>,
    session: Session,
    Form(fields): Form<HashMap<String, String>>,
) -> WebResult {
    let month = MonthQuery {
        y: fields.get("y").cloned(),
        m: fields.get("m").cloned(),
    };
    let (year, month) = match month.resolve() {
        Ok(ym) => ym,
        Err(e) => return Ok(fail_with(&session, DASHBOARD, &e)),
    };
    let to = calendar_path(year, month);

    let rooms = match registry.room_store().all_rooms() {
        Ok(r) => r,
        Err(e) => return Ok(fail_with(&session, &to, &e)),
    };

    let mut stashed = BTreeMap::new();
    for room in rooms {
        let blocks = session.require(&BlockMapKey(room.id));
        let reservations = session.require(&ReservationMapKey(room.id));
        let (Ok(blocks), Ok(reservations)) = (blocks, reservations) else {
            return Ok(fail_to(
                &session,
                &to,
                "The calendar changed since it was loaded, please try again",
            ));
        };
        stashed.insert(
            room.id,
            RoomCalendar {
                room,
                reservations,
                blocks,
            },
        );
    }

    match apply_block_edits(registry.ledger(), &stashed, &fields) {
        Ok(report) => {
            tracing::info!(
                removed = report.removed,
                added = report.added,
                skipped = report.skipped.len(),
                "calendar blocks updated"
            );
            if !report.skipped.is_empty() {
                warn(
                    &session,
                    format!(
                        "{} reserved day(s) were not blocked",
                        report.skipped.len()
                    ),
                );
            }
            Ok(done(&session, &to, "Changes saved"))
        }
        Err(e) => Ok(fail_with(&session, &to, &e)),
    }
}
