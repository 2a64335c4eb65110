//! Booking core: the restriction ledger, availability queries, the
//! reservation workflow, the admin calendar and the CLI-side logic.

pub mod admin;
pub mod auth;
pub mod availability;
pub mod calendar;
pub mod config;
pub mod ledger;
pub mod log;
pub mod workflow;
