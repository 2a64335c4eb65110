//! Reservation submission: parse, validate, persist the booking pair and
//! queue the notifications.

use crate::errors::{AppError, BookingStep};
use crate::forms::Form;
use crate::mail::MailQueue;
use crate::models::{MailData, Reservation};
use crate::store::{ReservationStore, RoomStore};
use crate::utils::date::parse_date;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const FIELD_START: &str = "start-date";
pub const FIELD_END: &str = "end-date";
pub const FIELD_ROOM: &str = "room-id";
pub const FIELD_FIRST_NAME: &str = "first-name";
pub const FIELD_LAST_NAME: &str = "last-name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PHONE: &str = "phone";

const MIN_FIRST_NAME: usize = 3;

/// How far a submission got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Received,
    FormValidated,
    Persisted,
    RestrictionLinked,
    Confirmed,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowState::Received => "received",
            WorkflowState::FormValidated => "form validated",
            WorkflowState::Persisted => "persisted",
            WorkflowState::RestrictionLinked => "restriction linked",
            WorkflowState::Confirmed => "confirmed",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub enum WorkflowOutcome {
    /// Booked; carries the stored reservation (with its new id).
    Confirmed(Reservation),
    /// Field errors. The submitted input comes back for re-rendering.
    Rejected {
        form: Form,
        reservation: Reservation,
    },
    /// Parse or store failure. `reached` is the last state entered.
    Failed {
        reached: WorkflowState,
        error: AppError,
    },
}

impl WorkflowOutcome {
    fn failed(reached: WorkflowState, error: AppError) -> Self {
        tracing::warn!(state = %reached, error = %error, "reservation failed");
        WorkflowOutcome::Failed { reached, error }
    }
}

/// Addresses used for the two notifications.
#[derive(Debug, Clone)]
pub struct Notify {
    pub from: String,
    pub owner: String,
}

#[derive(Clone)]
pub struct ReservationWorkflow {
    reservations: Arc<dyn ReservationStore>,
    rooms: Arc<dyn RoomStore>,
    mail: MailQueue,
    notify: Notify,
}

impl ReservationWorkflow {
    pub fn new(
        reservations: Arc<dyn ReservationStore>,
        rooms: Arc<dyn RoomStore>,
        mail: MailQueue,
        notify: Notify,
    ) -> Self {
        Self {
            reservations,
            rooms,
            mail,
            notify,
        }
    }

    pub fn submit(&self, values: HashMap<String, String>) -> WorkflowOutcome {
        let mut form = Form::new(values);

        // Received
        let start = match parse_date(form.get(FIELD_START)) {
            Some(d) => d,
            None => {
                let err = AppError::InvalidDate(form.get(FIELD_START).to_string());
                return WorkflowOutcome::failed(WorkflowState::Received, err);
            }
        };
        let end = match parse_date(form.get(FIELD_END)) {
            Some(d) => d,
            None => {
                let err = AppError::InvalidDate(form.get(FIELD_END).to_string());
                return WorkflowOutcome::failed(WorkflowState::Received, err);
            }
        };
        if start > end {
            return WorkflowOutcome::failed(
                WorkflowState::Received,
                AppError::InvalidRange { start, end },
            );
        }
        let room_id: i64 = match form.get(FIELD_ROOM).trim().parse() {
            Ok(id) => id,
            Err(_) => {
                let err = AppError::InvalidId(form.get(FIELD_ROOM).to_string());
                return WorkflowOutcome::failed(WorkflowState::Received, err);
            }
        };

        let mut reservation = Reservation::draft(start, end);
        reservation.room_id = room_id;
        reservation.first_name = form.get(FIELD_FIRST_NAME).trim().to_string();
        reservation.last_name = form.get(FIELD_LAST_NAME).trim().to_string();
        reservation.email = form.get(FIELD_EMAIL).trim().to_string();
        reservation.phone = form.get(FIELD_PHONE).trim().to_string();

        match self.rooms.room_by_id(room_id) {
            Ok(room) => reservation.room_name = room.room_name,
            Err(e) => tracing::debug!(room_id, error = %e, "room name unavailable"),
        }

        form.required(&[FIELD_FIRST_NAME, FIELD_LAST_NAME, FIELD_EMAIL]);
        form.min_length(FIELD_FIRST_NAME, MIN_FIRST_NAME);
        form.is_email(FIELD_EMAIL);
        if !form.valid() {
            tracing::info!(
                fields = ?form.errors.fields().collect::<Vec<_>>(),
                "reservation form rejected"
            );
            return WorkflowOutcome::Rejected { form, reservation };
        }

        // FormValidated
        let (res_id, restriction_id) =
            match self.reservations.insert_reservation_with_restriction(&reservation) {
                Ok(ids) => ids,
                Err(e) => {
                    let reached = match &e {
                        AppError::Booking {
                            step: BookingStep::Restriction,
                            ..
                        } => WorkflowState::Persisted,
                        _ => WorkflowState::FormValidated,
                    };
                    return WorkflowOutcome::failed(reached, e);
                }
            };
        reservation.id = res_id;
        tracing::info!(
            reservation_id = res_id,
            restriction_id,
            room_id,
            "reservation persisted and restriction linked"
        );

        // RestrictionLinked
        self.send_notifications(&reservation);

        WorkflowOutcome::Confirmed(reservation)
    }

    fn send_notifications(&self, r: &Reservation) {
        let guest = format!(
            "<strong>Reservation Confirmation</strong><br>\
             Dear {},<br>\
             This is to confirm your reservation from {} to {}.",
            r.first_name,
            r.start_str(),
            r.end_str()
        );
        self.mail.send(MailData {
            to: r.email.clone(),
            from: self.notify.from.clone(),
            subject: "Reservation Confirmation".into(),
            content: guest,
            template: "basic.html".into(),
        });

        let owner = format!(
            "<strong>Reservation Notification</strong><br>\
             A reservation has been made for {} from {} to {} by {}.",
            if r.room_name.is_empty() {
                format!("room {}", r.room_id)
            } else {
                r.room_name.clone()
            },
            r.start_str(),
            r.end_str(),
            r.full_name()
        );
        self.mail.send(MailData {
            to: self.notify.owner.clone(),
            from: self.notify.from.clone(),
            subject: "Reservation Notification".into(),
            content: owner,
            template: "basic.html".into(),
        });
    }
}
