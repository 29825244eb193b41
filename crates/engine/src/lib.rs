//! famtree Engine library.
//!
//! Generates, stores and serves synthetic ancestor trees.
//!
//! ## Structure
//!
//! - `use_cases/` - Fill, lookup and clear orchestration
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition
//! - `config` - Environment configuration

pub mod api;
pub mod app;
pub mod config;
pub mod infrastructure;
pub mod use_cases;

/// End-to-end fill flows against a real SQLite file.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
