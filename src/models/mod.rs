//! Domain models shared by the store, the booking core and the web layer.

pub mod mail;
pub mod reservation;
pub mod restriction;
pub mod room;
pub mod user;

pub use mail::MailData;
pub use reservation::Reservation;
pub use restriction::{RestrictionKind, RoomRestriction};
pub use room::Room;
pub use user::User;
