//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate:
//! - Owns all its constituent parts (enforced by Rust ownership)
//! - Exposes behavior through methods, not public fields
//! - Refuses mutations that would break its invariants

pub mod ancestor_tree;

pub use ancestor_tree::{AncestorTree, TreeSlot};
