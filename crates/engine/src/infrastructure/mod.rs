//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod names;
pub mod ports;
pub mod sqlite;
