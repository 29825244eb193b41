//! Domain entities - Core records with identity

mod event;
mod person;
mod user;

pub use event::{Event, EventType};
pub use person::{Gender, Person};
pub use user::User;
