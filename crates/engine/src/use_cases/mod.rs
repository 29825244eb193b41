//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific area.
//! Use cases orchestrate across ports to fulfill user stories.

pub mod clear;
pub mod fill;
pub mod load;
pub mod lookup;

pub use clear::ClearStore;
pub use fill::FillUseCases;
pub use load::LoadStore;
pub use lookup::LookupUseCases;
