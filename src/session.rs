//! Server-side sessions with typed keys.
//!
//! Each session is a string-keyed bag of JSON values living in a
//! [`SessionStore`]. Values are read and written through [`SessionKey`]
//! implementations, so a key always yields the type it was stored with.

use crate::core::calendar::DayMap;
use crate::errors::{AppError, AppResult};
use crate::models::Reservation;
use chrono::{DateTime, Duration, Local};
use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

pub trait SessionKey {
    type Value: Serialize + DeserializeOwned;

    fn name(&self) -> String;
}

macro_rules! session_key {
    ($key:ident, $name:literal, $value:ty) => {
        pub struct $key;

        impl SessionKey for $key {
            type Value = $value;

            fn name(&self) -> String {
                $name.to_string()
            }
        }
    };
}

session_key!(ReservationKey, "reservation", Reservation);
session_key!(FlashKey, "flash", String);
session_key!(ErrorKey, "error", String);
session_key!(WarningKey, "warning", String);
session_key!(UserIdKey, "userId", i64);

/// Day -> block id for one room, as last shown on the calendar.
pub struct BlockMapKey(pub i64);

impl SessionKey for BlockMapKey {
    type Value = DayMap;

    fn name(&self) -> String {
        format!("block_map_{}", self.0)
    }
}

/// Day -> reservation id for one room, as last shown on the calendar.
pub struct ReservationMapKey(pub i64);

impl SessionKey for ReservationMapKey {
    type Value = DayMap;

    fn name(&self) -> String {
        format!("reservation_map_{}", self.0)
    }
}

struct Entry {
    values: HashMap<String, Value>,
    expires_at: DateTime<Local>,
}

/// All live sessions, keyed by the id carried in the session cookie.
pub struct SessionStore {
    sessions: DashMap<Uuid, Entry>,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            lifetime,
        }
    }

    /// Handle for `id` if it names a live session, otherwise for a fresh
    /// one. A fresh session is only stored once something is written to it.
    pub fn load(self: &Arc<Self>, id: Option<Uuid>) -> Session {
        if let Some(id) = id {
            let live = self
                .sessions
                .get(&id)
                .map(|e| e.expires_at > Local::now())
                .unwrap_or(false);
            if live {
                return Session::new(self.clone(), id, true);
            }
            self.sessions.remove(&id);
        }
        Session::new(self.clone(), Uuid::new_v4(), false)
    }

    fn insert(&self, id: Uuid, values: HashMap<String, Value>) {
        let expires_at = Local::now() + self.lifetime;
        self.sessions.insert(id, Entry { values, expires_at });
    }

    /// Drop expired sessions.
    pub fn purge_expired(&self) -> usize {
        let now = Local::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, e| e.expires_at > now);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn read(&self, id: &Uuid, name: &str) -> Option<Value> {
        self.sessions
            .get(id)
            .and_then(|e| e.values.get(name).cloned())
    }

    fn write(&self, id: &Uuid, name: String, value: Value) {
        if let Some(mut e) = self.sessions.get_mut(id) {
            e.values.insert(name, value);
        }
    }

    fn delete(&self, id: &Uuid, name: &str) -> Option<Value> {
        self.sessions
            .get_mut(id)
            .and_then(|mut e| e.values.remove(name))
    }
}

struct State {
    id: Uuid,
    /// The store holds an entry for `id`.
    stored: bool,
    /// Cookie must be (re)sent.
    dirty: bool,
}

/// A request's view of its session.
#[derive(Clone)]
pub struct Session {
    store: Arc<SessionStore>,
    state: Arc<Mutex<State>>,
}

impl Session {
    fn new(store: Arc<SessionStore>, id: Uuid, stored: bool) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(State {
                id,
                stored,
                dirty: false,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn id(&self) -> Uuid {
        self.state().id
    }

    /// True when the response has to carry a new session cookie.
    pub fn needs_cookie(&self) -> bool {
        self.state().dirty
    }

    pub fn get<K: SessionKey>(&self, key: &K) -> Option<K::Value> {
        let name = key.name();
        let raw = self.store.read(&self.id(), &name)?;
        match serde_json::from_value(raw) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(key = %name, error = %e, "discarding unreadable session value");
                None
            }
        }
    }

    /// Like [`Session::get`], but absence is a [`AppError::SessionMissing`].
    pub fn require<K: SessionKey>(&self, key: &K) -> AppResult<K::Value> {
        self.get(key)
            .ok_or_else(|| AppError::SessionMissing(key.name()))
    }

    pub fn put<K: SessionKey>(&self, key: &K, value: &K::Value) {
        let name = key.name();
        match serde_json::to_value(value) {
            Ok(v) => {
                let id = self.persist();
                self.store.write(&id, name, v);
            }
            Err(e) => tracing::error!(key = %name, error = %e, "cannot store session value"),
        }
    }

    /// Store the session on first write; from then on it needs a cookie.
    fn persist(&self) -> Uuid {
        let mut st = self.state();
        if !st.stored {
            self.store.insert(st.id, HashMap::new());
            st.stored = true;
            st.dirty = true;
        }
        st.id
    }

    pub fn remove<K: SessionKey>(&self, key: &K) {
        self.store.delete(&self.id(), &key.name());
    }

    /// Read and remove in one step (one-shot notices).
    pub fn pop<K: SessionKey>(&self, key: &K) -> Option<K::Value> {
        let raw = self.store.delete(&self.id(), &key.name())?;
        serde_json::from_value(raw).ok()
    }

    /// Move the session data to a fresh id, e.g. on login.
    pub fn renew(&self) {
        let mut st = self.state();
        let old = st.id;
        let new = Uuid::new_v4();
        let values = self
            .store
            .sessions
            .remove(&old)
            .map(|(_, e)| e.values)
            .unwrap_or_default();
        self.store.insert(new, values);
        st.id = new;
        st.stored = true;
        st.dirty = true;
    }

    /// Throw away every value and continue under a fresh, empty session.
    pub fn destroy(&self) {
        let mut st = self.state();
        self.store.sessions.remove(&st.id);
        st.id = Uuid::new_v4();
        st.stored = false;
    }
}
