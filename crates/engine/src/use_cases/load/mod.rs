//! Load use case.
//!
//! Replaces the whole store with caller-supplied users, persons and events.
//! This is how a fresh server gets its registered users and their root
//! persons before any fill can run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use famtree_domain::{Event, Person, PersonId, User, Username};

use crate::infrastructure::ports::{RepoError, TreeRepo};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Invalid load request: {0}")]
    InvalidRequest(String),
    #[error("Load failed: {0}")]
    Repo(#[from] RepoError),
}

impl LoadError {
    /// True when the request was at fault and the store was left untouched.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::Repo(RepoError::ConstraintViolation(_))
        )
    }
}

/// Rows to load. Every array must be present, even if empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadRequest {
    pub users: Option<Vec<User>>,
    pub persons: Option<Vec<Person>>,
    pub events: Option<Vec<Event>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub user_count: usize,
    pub person_count: usize,
    pub event_count: usize,
}

/// Result of a load as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOutcome {
    pub success: bool,
    pub message: String,
}

impl LoadOutcome {
    pub fn from_result(result: &Result<LoadSummary, LoadError>) -> Self {
        match result {
            Ok(summary) => Self {
                success: true,
                message: format!(
                    "Successfully added {} users, {} persons, and {} events to the database.",
                    summary.user_count, summary.person_count, summary.event_count
                ),
            },
            Err(e) => Self {
                success: false,
                message: e.to_string(),
            },
        }
    }
}

fn required<T>(rows: Option<Vec<T>>, name: &str) -> Result<Vec<T>, LoadError> {
    rows.ok_or_else(|| LoadError::InvalidRequest(format!("missing {} array", name)))
}

/// Every row must hang off a loaded user: each user's root person is among
/// the persons, and every person and event belongs to a loaded user.
fn check_ownership(users: &[User], persons: &[Person], events: &[Event]) -> Result<(), LoadError> {
    let usernames: HashSet<&Username> = users.iter().map(|u| &u.username).collect();
    let owners: HashMap<PersonId, &Username> =
        persons.iter().map(|p| (p.id, &p.username)).collect();

    for user in users {
        if owners.get(&user.person_id) != Some(&&user.username) {
            return Err(LoadError::InvalidRequest(format!(
                "user {} has no root person {}",
                user.username, user.person_id
            )));
        }
    }

    if let Some(person) = persons.iter().find(|p| !usernames.contains(&p.username)) {
        return Err(LoadError::InvalidRequest(format!(
            "person {} belongs to unknown user {}",
            person.id, person.username
        )));
    }

    for event in events {
        if owners.get(&event.person_id) != Some(&&event.username) {
            return Err(LoadError::InvalidRequest(format!(
                "event {} refers to person {} outside {}'s tree",
                event.id, event.person_id, event.username
            )));
        }
    }

    Ok(())
}

pub struct LoadStore {
    tree_repo: Arc<dyn TreeRepo>,
}

impl LoadStore {
    pub fn new(tree_repo: Arc<dyn TreeRepo>) -> Self {
        Self { tree_repo }
    }

    /// Validate the request and swap it into storage.
    ///
    /// Nothing is cleared unless every row can be written.
    pub async fn execute(&self, request: LoadRequest) -> Result<LoadSummary, LoadError> {
        let users = required(request.users, "users")?;
        let persons = required(request.persons, "persons")?;
        let events = required(request.events, "events")?;
        check_ownership(&users, &persons, &events)?;

        self.tree_repo
            .replace_all(&users, &persons, &events)
            .await?;

        Ok(LoadSummary {
            user_count: users.len(),
            person_count: persons.len(),
            event_count: events.len(),
        })
    }

    /// Run a load and log the result.
    pub async fn run(&self, request: LoadRequest) -> Result<LoadSummary, LoadError> {
        let result = self.execute(request).await;
        match &result {
            Ok(summary) => tracing::info!(
                users = summary.user_count,
                persons = summary.person_count,
                events = summary.event_count,
                "Load completed"
            ),
            Err(e) => tracing::warn!(error = %e, "Load failed"),
        }
        result
    }
}
