//! Backend E2E integration tests.
//!
//! These tests run complete fills through a fully-wired App against a real
//! SQLite file in a temp directory, then inspect what was stored.
//!
//! # Running E2E Tests
//!
//! ```bash
//! cargo test -p famtree-engine --lib e2e_tests
//! ```

mod e2e_helpers;

pub use e2e_helpers::*;
