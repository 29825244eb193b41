//! Clear use case.
//!
//! Wipes every user, person, event and token from storage.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::{RepoError, TreeRepo};

#[derive(Debug, thiserror::Error)]
pub enum ClearError {
    #[error("Clear failed: {0}")]
    Repo(#[from] RepoError),
}

/// Result of a clear as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearOutcome {
    pub success: bool,
    pub message: String,
}

pub struct ClearStore {
    tree_repo: Arc<dyn TreeRepo>,
}

impl ClearStore {
    pub fn new(tree_repo: Arc<dyn TreeRepo>) -> Self {
        Self { tree_repo }
    }

    pub async fn execute(&self) -> Result<(), ClearError> {
        self.tree_repo.clear_all().await?;
        Ok(())
    }

    /// Run a clear and report the outcome.
    pub async fn clear(&self) -> ClearOutcome {
        match self.execute().await {
            Ok(()) => {
                tracing::info!("Cleared all stored data");
                ClearOutcome {
                    success: true,
                    message: "Clear succeeded.".to_string(),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Clear failed");
                ClearOutcome {
                    success: false,
                    message: e.to_string(),
                }
            }
        }
    }
}
