//! Back-office operations on stored reservations.

use crate::errors::{AppError, AppResult};
use crate::forms::Form;
use crate::models::Reservation;
use crate::store::ReservationStore;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Listing an admin page came from; used to send the admin back there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    New,
    All,
    Calendar,
}

impl FromStr for ListingSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ListingSource::New),
            "all" => Ok(ListingSource::All),
            "cal" => Ok(ListingSource::Calendar),
            other => Err(AppError::InvalidId(format!("unknown listing '{}'", other))),
        }
    }
}

impl ListingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingSource::New => "new",
            ListingSource::All => "all",
            ListingSource::Calendar => "cal",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ListingSource::New => "/admin/reservations-new",
            ListingSource::All => "/admin/reservations-all",
            ListingSource::Calendar => "/admin/reservations-calendar",
        }
    }
}

pub enum EditOutcome {
    Saved(Reservation),
    Rejected { form: Form, reservation: Reservation },
}

#[derive(Clone)]
pub struct ReservationAdmin {
    store: Arc<dyn ReservationStore>,
}

impl ReservationAdmin {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    pub fn all(&self) -> AppResult<Vec<Reservation>> {
        self.store.all_reservations()
    }

    pub fn unprocessed(&self) -> AppResult<Vec<Reservation>> {
        self.store.new_reservations()
    }

    pub fn show(&self, id: i64) -> AppResult<Reservation> {
        self.store.reservation_by_id(id)
    }

    /// Replace the guest details with the posted values.
    pub fn update(&self, id: i64, values: HashMap<String, String>) -> AppResult<EditOutcome> {
        let mut reservation = self.store.reservation_by_id(id)?;

        let mut form = Form::new(values);
        form.required(&["first-name", "last-name", "email"]);
        form.is_email("email");

        reservation.first_name = form.get("first-name").trim().to_string();
        reservation.last_name = form.get("last-name").trim().to_string();
        reservation.email = form.get("email").trim().to_string();
        reservation.phone = form.get("phone").trim().to_string();

        if !form.valid() {
            return Ok(EditOutcome::Rejected { form, reservation });
        }

        self.store.update_reservation(&reservation)?;
        tracing::info!(id, "reservation updated");
        Ok(EditOutcome::Saved(reservation))
    }

    pub fn mark_processed(&self, id: i64) -> AppResult<()> {
        self.store.update_processed(id, true)?;
        tracing::info!(id, "reservation processed");
        Ok(())
    }

    /// Removes the reservation and every restriction row it owns.
    pub fn delete(&self, id: i64) -> AppResult<()> {
        self.store.delete_reservation(id)?;
        tracing::info!(id, "reservation deleted");
        Ok(())
    }
}
