//! Everything a request handler needs, built once at startup.

use crate::config::Config;
use crate::core::admin::ReservationAdmin;
use crate::core::auth::Authenticator;
use crate::core::availability::AvailabilityEngine;
use crate::core::ledger::Ledger;
use crate::core::workflow::{Notify, ReservationWorkflow};
use crate::mail::MailQueue;
use crate::render::Renderer;
use crate::session::SessionStore;
use crate::store::{AvailabilityStore, ReservationStore, RoomStore, UserStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppRegistry {
    room_store: Arc<dyn RoomStore>,
    ledger: Ledger,
    availability: AvailabilityEngine,
    workflow: ReservationWorkflow,
    admin: ReservationAdmin,
    authenticator: Authenticator,
    sessions: Arc<SessionStore>,
    renderer: Arc<dyn Renderer>,
    secure_cookies: bool,
}

impl AppRegistry {
    pub fn new<S>(
        store: Arc<S>,
        mail: MailQueue,
        renderer: Arc<dyn Renderer>,
        config: &Config,
    ) -> Self
    where
        S: RoomStore + AvailabilityStore + ReservationStore + UserStore + 'static,
    {
        let room_store: Arc<dyn RoomStore> = store.clone();
        let availability_store: Arc<dyn AvailabilityStore> = store.clone();
        let reservation_store: Arc<dyn ReservationStore> = store.clone();
        let user_store: Arc<dyn UserStore> = store;

        let notify = Notify {
            from: config.mail_from.clone(),
            owner: config.owner_email.clone(),
        };
        let lifetime = chrono::Duration::hours(config.session_lifetime_hours.max(1));

        Self {
            ledger: Ledger::new(availability_store.clone()),
            availability: AvailabilityEngine::new(availability_store),
            workflow: ReservationWorkflow::new(
                reservation_store.clone(),
                room_store.clone(),
                mail,
                notify,
            ),
            admin: ReservationAdmin::new(reservation_store),
            authenticator: Authenticator::new(user_store),
            room_store,
            sessions: Arc::new(SessionStore::new(lifetime)),
            renderer,
            secure_cookies: config.in_production,
        }
    }

    pub fn room_store(&self) -> Arc<dyn RoomStore> {
        self.room_store.clone()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn availability(&self) -> &AvailabilityEngine {
        &self.availability
    }

    pub fn workflow(&self) -> &ReservationWorkflow {
        &self.workflow
    }

    pub fn admin(&self) -> &ReservationAdmin {
        &self.admin
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn sessions(&self) -> Arc<SessionStore> {
        self.sessions.clone()
    }

    pub fn renderer(&self) -> Arc<dyn Renderer> {
        self.renderer.clone()
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}
