//! Value objects - immutable, validated building blocks for entities.

mod generations;
mod life_years;
mod location;
mod names;

pub use generations::{Generations, MAX_GENERATIONS};
pub use life_years::{
    root_birth_year, CoupleYears, LifeYears, MAX_LIFESPAN, MAX_MARRIAGE_DELAY,
    MAX_PARENT_AGE_GAP, MAX_ROOT_AGE, MIN_LIFESPAN, MIN_MARRIAGE_AGE, MIN_PARENT_AGE_GAP,
    MIN_ROOT_AGE,
};
pub use location::Location;
pub use names::{PersonName, Username};
