//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Database access (could swap SQLite -> Postgres)
//! - Name/location data (could swap the JSON dataset for a service)
//! - Credentials
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{AuthRepo, EventRepo, PersonRepo, TreeRepo};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::NameLocationPort;

pub use error::{ProviderError, RepoError};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockAuthRepo, MockEventRepo, MockPersonRepo, MockTreeRepo};

#[cfg(test)]
pub use external::MockNameLocationPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};
