//! Repository port traits for database access.

use async_trait::async_trait;
use famtree_domain::{AncestorTree, Event, EventId, Person, PersonId, User, Username};

use super::error::RepoError;

// =============================================================================
// Read Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonRepo: Send + Sync {
    async fn get(&self, id: PersonId) -> Result<Option<Person>, RepoError>;
    async fn list_for_user(&self, username: &Username) -> Result<Vec<Person>, RepoError>;

    /// The person registered for `username`, which every tree grows from.
    async fn find_root(&self, username: &Username) -> Result<Option<Person>, RepoError>;

    /// Registration hook: store a user's root person.
    async fn save_root(&self, root: &Person) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepo: Send + Sync {
    async fn get(&self, id: EventId) -> Result<Option<Event>, RepoError>;
    async fn list_for_user(&self, username: &Username) -> Result<Vec<Event>, RepoError>;
}

// =============================================================================
// Tree Persistence
// =============================================================================

/// Bulk storage for generated trees. Every method is one transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TreeRepo: Send + Sync {
    /// Remove every person and event of `username` except the root person.
    /// Succeeds when there is nothing to remove.
    async fn delete_generated_tree(&self, username: &Username) -> Result<(), RepoError>;

    /// Insert all rows or none of them.
    async fn persist_tree(&self, persons: &[Person], events: &[Event]) -> Result<(), RepoError>;

    /// Delete the previous tree of the tree's owner, relink the root and
    /// insert the new rows, all in one transaction.
    async fn replace_tree(&self, tree: &AncestorTree) -> Result<(), RepoError>;

    /// Remove every row the store holds.
    async fn clear_all(&self) -> Result<(), RepoError>;

    /// Clear the store and insert the given users (with their tokens),
    /// persons and events. Either all of it happens or none of it does.
    async fn replace_all(
        &self,
        users: &[User],
        persons: &[Person],
        events: &[Event],
    ) -> Result<(), RepoError>;
}

// =============================================================================
// Credentials
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthRepo: Send + Sync {
    /// Map an opaque token to its user, or `None` if the token is unknown.
    async fn resolve_user(&self, token: &str) -> Result<Option<Username>, RepoError>;

    /// Registration/login hook: remember a token for `username`.
    async fn save_token(&self, token: &str, username: &Username) -> Result<(), RepoError>;
}
