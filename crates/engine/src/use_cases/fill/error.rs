//! Fill operation errors.

use famtree_domain::{DomainError, Username};

use crate::infrastructure::ports::{ProviderError, RepoError};

/// Errors that can occur while generating and storing a tree.
#[derive(Debug, thiserror::Error)]
pub enum FillError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(DomainError),
    #[error("User not found: {0}")]
    UserNotFound(Username),
    #[error("Name/location provider failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("Persistence failed: {0}")]
    Persistence(#[from] RepoError),
    #[error("Generated tree is inconsistent: {0}")]
    InconsistentTree(DomainError),
}

impl FillError {
    /// True when the request itself was rejected and nothing was touched.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::UserNotFound(_))
    }
}
