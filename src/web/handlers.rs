//! Public pages and the booking flow.

use crate::core::workflow::{FIELD_END, FIELD_START, WorkflowOutcome, WorkflowState};
use crate::errors::{AppError, ErrorKind};
use crate::forms::Form as PostedForm;
use crate::models::Reservation;
use crate::registry::AppRegistry;
use crate::render::TemplateData;
use crate::session::{ErrorKey, FlashKey, ReservationKey, Session, UserIdKey, WarningKey};
use crate::utils::date::parse_date;
use crate::web::error::{WebResult, done, fail_to, fail_with};
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

type Fields = HashMap<String, String>;

/// Render `template` with the session's one-shot notices folded in.
pub(crate) fn page(
    registry: &AppRegistry,
    session: &Session,
    template: &str,
    data: TemplateData,
) -> WebResult {
    page_with_status(registry, session, template, data, StatusCode::OK)
}

pub(crate) fn page_with_status(
    registry: &AppRegistry,
    session: &Session,
    template: &str,
    mut data: TemplateData,
    status: StatusCode,
) -> WebResult {
    data.flash = session.pop(&FlashKey).unwrap_or_default();
    data.error = session.pop(&ErrorKey).unwrap_or_default();
    data.warning = session.pop(&WarningKey).unwrap_or_default();
    data.is_authenticated = session.get(&UserIdKey).is_some();

    let rendered = registry.renderer().render(template, &data)?;
    Ok((status, [(CONTENT_TYPE, rendered.content_type)], rendered.body).into_response())
}

fn reservation_page_data(reservation: &Reservation) -> TemplateData {
    TemplateData::new()
        .with("reservation", reservation)
        .with_string(FIELD_START, reservation.start_str())
        .with_string(FIELD_END, reservation.end_str())
}

pub async fn home(State(registry): State<AppRegistry>, session: Session) -> WebResult {
    page(&registry, &session, "home.page", TemplateData::new())
}

pub async fn about(State(registry): State<AppRegistry>, session: Session) -> WebResult {
    page(&registry, &session, "about.page", TemplateData::new())
}

pub async fn contact(State(registry): State<AppRegistry>, session: Session) -> WebResult {
    page(&registry, &session, "contact.page", TemplateData::new())
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "hotelbook",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn room(
    State(registry): State<AppRegistry>,
    session: Session,
    Path(id): Path<String>,
) -> WebResult {
    let Ok(id) = id.parse::<i64>() else {
        return Ok(fail_to(&session, "/", "Invalid room id"));
    };
    let room = match registry.room_store().room_by_id(id) {
        Ok(r) => r,
        Err(e) => return Ok(fail_with(&session, "/", &e)),
    };
    page(
        &registry,
        &session,
        "room.page",
        TemplateData::new().with("room", &room),
    )
}

pub async fn search_availability(
    State(registry): State<AppRegistry>,
    session: Session,
) -> WebResult {
    page(&registry, &session, "search-availability.page", TemplateData::new())
}

pub async fn post_search_availability(
    State(registry): State<AppRegistry>,
    session: Session,
    Form(fields): Form<Fields>,
) -> WebResult {
    let get = |k: &str| fields.get(k).map(String::as_str).unwrap_or("");

    let Some(start) = parse_date(get("start")) else {
        return Ok(fail_to(&session, "/", "Can't parse start date"));
    };
    let Some(end) = parse_date(get("end")) else {
        return Ok(fail_to(&session, "/", "Can't parse end date"));
    };
    if start > end {
        return Ok(fail_to(
            &session,
            "/search-availability",
            "The departure date must not be before the arrival date",
        ));
    }

    let rooms = match registry.availability().available_rooms(start, end) {
        Ok(rooms) => rooms,
        Err(e) => return Ok(fail_with(&session, "/", &e)),
    };

    if rooms.is_empty() {
        tracing::info!(%start, %end, "no rooms available");
        session.put(&ErrorKey, &"No availability".to_string());
        return Ok(Redirect::to("/search-availability").into_response());
    }

    session.put(&ReservationKey, &Reservation::draft(start, end));

    page(
        &registry,
        &session,
        "choose-room.page",
        TemplateData::new().with("rooms", &rooms),
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub ok: bool,
    pub message: String,
    pub room_id: String,
    pub start_date: String,
    pub end_date: String,
}

/// JSON availability probe for a single room.
pub async fn availability_json(
    State(registry): State<AppRegistry>,
    Form(fields): Form<Fields>,
) -> Json<AvailabilityResponse> {
    let get = |k: &str| fields.get(k).map(|s| s.trim().to_string()).unwrap_or_default();

    let start_raw = get("start");
    let end_raw = get("end");
    let room_raw = fields
        .get("room_id")
        .or_else(|| fields.get("room-id"))
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let mut resp = AvailabilityResponse {
        ok: false,
        message: String::new(),
        room_id: room_raw.clone(),
        start_date: start_raw.clone(),
        end_date: end_raw.clone(),
    };

    let (Some(start), Some(end), Ok(room_id)) = (
        parse_date(&start_raw),
        parse_date(&end_raw),
        room_raw.parse::<i64>(),
    ) else {
        resp.message = "Invalid request parameters".into();
        return Json(resp);
    };
    if start > end {
        resp.message = "End date is before start date".into();
        return Json(resp);
    }

    match registry.availability().is_room_available(room_id, start, end) {
        Ok(available) => resp.ok = available,
        Err(e) => {
            tracing::error!(room_id, error = %e, "availability probe failed");
            resp.message = "Error querying database".into();
        }
    }
    Json(resp)
}

pub async fn choose_room(
    session: Session,
    Path(id): Path<String>,
) -> WebResult {
    let Ok(room_id) = id.parse::<i64>() else {
        return Ok(fail_to(&session, "/", "Missing or invalid room id"));
    };
    let mut res = match session.require(&ReservationKey) {
        Ok(r) => r,
        Err(e) => return Ok(fail_with(&session, "/", &e)),
    };

    res.room_id = room_id;
    session.put(&ReservationKey, &res);

    Ok(Redirect::to("/make-reservation").into_response())
}

#[derive(Debug, Deserialize)]
pub struct BookRoomQuery {
    #[serde(default)]
    id: String,
    #[serde(default)]
    s: String,
    #[serde(default)]
    e: String,
}

/// Book straight from a room page: `?id=<room>&s=<start>&e=<end>`.
pub async fn book_room(
    State(registry): State<AppRegistry>,
    session: Session,
    Query(q): Query<BookRoomQuery>,
) -> WebResult {
    let Ok(room_id) = q.id.parse::<i64>() else {
        return Ok(fail_to(&session, "/", "Missing or invalid room id"));
    };
    let (Some(start), Some(end)) = (parse_date(&q.s), parse_date(&q.e)) else {
        return Ok(fail_to(&session, "/", "Can't parse dates"));
    };
    if start > end {
        return Ok(fail_to(
            &session,
            "/search-availability",
            "The departure date must not be before the arrival date",
        ));
    }
    let room = match registry.room_store().room_by_id(room_id) {
        Ok(r) => r,
        Err(e) => return Ok(fail_with(&session, "/", &e)),
    };

    let mut res = Reservation::draft(start, end);
    res.room_id = room.id;
    res.room_name = room.room_name;
    session.put(&ReservationKey, &res);

    Ok(Redirect::to("/make-reservation").into_response())
}

pub async fn make_reservation(
    State(registry): State<AppRegistry>,
    session: Session,
) -> WebResult {
    let mut res = match session.require(&ReservationKey) {
        Ok(r) => r,
        Err(e) => return Ok(fail_with(&session, "/", &e)),
    };
    let room = match registry.room_store().room_by_id(res.room_id) {
        Ok(r) => r,
        Err(_) => return Ok(fail_to(&session, "/", "Can't find room")),
    };
    res.room_name = room.room_name;
    session.put(&ReservationKey, &res);

    page(
        &registry,
        &session,
        "make-reservation.page",
        reservation_page_data(&res).with_form(PostedForm::default()),
    )
}

pub async fn post_make_reservation(
    State(registry): State<AppRegistry>,
    session: Session,
    Form(fields): Form<Fields>,
) -> WebResult {
    match registry.workflow().submit(fields) {
        WorkflowOutcome::Confirmed(res) => {
            session.put(&ReservationKey, &res);
            Ok(Redirect::to("/reservation-summary").into_response())
        }
        WorkflowOutcome::Rejected { form, reservation } => page_with_status(
            &registry,
            &session,
            "make-reservation.page",
            reservation_page_data(&reservation).with_form(form),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        WorkflowOutcome::Failed { reached, error } => {
            let message = match (error.kind(), reached) {
                (ErrorKind::Parse, _) => format!("Can't parse form: {}", error),
                (_, WorkflowState::Persisted) => "Can't insert room restriction".to_string(),
                _ => "Can't insert reservation into the database".to_string(),
            };
            Ok(fail_to(&session, "/", message))
        }
    }
}

pub async fn reservation_summary(
    State(registry): State<AppRegistry>,
    session: Session,
) -> WebResult {
    let Some(res) = session.pop(&ReservationKey) else {
        tracing::warn!("reservation summary without a reservation in session");
        return Ok(fail_to(
            &session,
            "/",
            "Can't get reservation from session",
        ));
    };
    page(
        &registry,
        &session,
        "reservation-summary.page",
        reservation_page_data(&res),
    )
}

pub async fn login(State(registry): State<AppRegistry>, session: Session) -> WebResult {
    page(
        &registry,
        &session,
        "login.page",
        TemplateData::new().with_form(PostedForm::default()),
    )
}

pub async fn post_login(
    State(registry): State<AppRegistry>,
    session: Session,
    Form(fields): Form<Fields>,
) -> WebResult {
    session.renew();

    let mut form = PostedForm::new(fields);
    form.required(&["email", "password"]);
    form.is_email("email");
    if !form.valid() {
        form.values.remove("password");
        return page_with_status(
            &registry,
            &session,
            "login.page",
            TemplateData::new().with_form(form),
            StatusCode::UNPROCESSABLE_ENTITY,
        );
    }

    match registry
        .authenticator()
        .authenticate(form.get("email"), form.get("password"))
    {
        Ok(user_id) => {
            session.put(&UserIdKey, &user_id);
            tracing::info!(user_id, "admin logged in");
            Ok(done(&session, "/", "Logged in successfully"))
        }
        Err(AppError::Unauthorized) => {
            session.put(&ErrorKey, &"Invalid login credentials".to_string());
            Ok(Redirect::to("/user/login").into_response())
        }
        Err(e) => Ok(fail_with(&session, "/user/login", &e)),
    }
}

pub async fn logout(session: Session) -> Response {
    session.destroy();
    Redirect::to("/user/login").into_response()
}
