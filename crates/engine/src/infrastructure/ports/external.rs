//! External service port traits.

use famtree_domain::{Gender, Location, PersonName};

use super::error::ProviderError;

/// Source of plausible names and places. Implementations must not keep
/// per-call state that callers can observe.
#[cfg_attr(test, mockall::automock)]
pub trait NameLocationPort: Send + Sync {
    fn random_name(&self, gender: Gender) -> Result<PersonName, ProviderError>;
    fn random_location(&self) -> Result<Location, ProviderError>;
}
