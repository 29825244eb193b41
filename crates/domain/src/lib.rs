//! famtree domain - persons, life events, and the invariants of a generated
//! ancestor tree.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use aggregates::{AncestorTree, TreeSlot};
pub use entities::{Event, EventType, Gender, Person, User};
pub use error::DomainError;
pub use ids::{EventId, PersonId};
pub use value_objects::{
    root_birth_year, CoupleYears, Generations, LifeYears, Location, PersonName, Username,
    MAX_GENERATIONS,
};
