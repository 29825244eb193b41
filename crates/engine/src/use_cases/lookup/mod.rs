//! Lookup use cases.
//!
//! Read access to generated persons and events. Every call carries an auth
//! token; records are only visible to the user that owns them.

use std::sync::Arc;

use famtree_domain::{Event, EventId, Person, PersonId, Username};

use crate::infrastructure::ports::{AuthRepo, EventRepo, PersonRepo, RepoError};

/// Errors that can occur during lookups.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Invalid auth token")]
    InvalidCredential,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} belongs to another user")]
    Forbidden(String),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Container for lookup use cases.
pub struct LookupUseCases {
    pub people: Arc<PersonLookup>,
    pub events: Arc<EventLookup>,
}

impl LookupUseCases {
    pub fn new(people: Arc<PersonLookup>, events: Arc<EventLookup>) -> Self {
        Self { people, events }
    }
}

async fn authenticate(auth: &dyn AuthRepo, token: &str) -> Result<Username, LookupError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(LookupError::InvalidCredential);
    }
    auth.resolve_user(token)
        .await?
        .ok_or(LookupError::InvalidCredential)
}

fn check_owner(owner: &Username, caller: &Username, what: String) -> Result<(), LookupError> {
    if owner == caller {
        Ok(())
    } else {
        Err(LookupError::Forbidden(what))
    }
}

// =============================================================================
// Persons
// =============================================================================

pub struct PersonLookup {
    auth: Arc<dyn AuthRepo>,
    person_repo: Arc<dyn PersonRepo>,
}

impl PersonLookup {
    pub fn new(auth: Arc<dyn AuthRepo>, person_repo: Arc<dyn PersonRepo>) -> Self {
        Self { auth, person_repo }
    }

    pub async fn get(&self, token: &str, id: PersonId) -> Result<Person, LookupError> {
        let caller = authenticate(self.auth.as_ref(), token).await?;
        let person = self
            .person_repo
            .get(id)
            .await?
            .ok_or_else(|| LookupError::NotFound(format!("Person {}", id)))?;
        check_owner(&person.username, &caller, format!("Person {}", id))?;
        Ok(person)
    }

    /// Every person of the caller, root included.
    pub async fn list(&self, token: &str) -> Result<Vec<Person>, LookupError> {
        let caller = authenticate(self.auth.as_ref(), token).await?;
        Ok(self.person_repo.list_for_user(&caller).await?)
    }
}

// =============================================================================
// Events
// =============================================================================

pub struct EventLookup {
    auth: Arc<dyn AuthRepo>,
    event_repo: Arc<dyn EventRepo>,
}

impl EventLookup {
    pub fn new(auth: Arc<dyn AuthRepo>, event_repo: Arc<dyn EventRepo>) -> Self {
        Self { auth, event_repo }
    }

    pub async fn get(&self, token: &str, id: EventId) -> Result<Event, LookupError> {
        let caller = authenticate(self.auth.as_ref(), token).await?;
        let event = self
            .event_repo
            .get(id)
            .await?
            .ok_or_else(|| LookupError::NotFound(format!("Event {}", id)))?;
        check_owner(&event.username, &caller, format!("Event {}", id))?;
        Ok(event)
    }

    /// Every event of the caller, grouped by person and in life order
    /// within each person.
    pub async fn list(&self, token: &str) -> Result<Vec<Event>, LookupError> {
        let caller = authenticate(self.auth.as_ref(), token).await?;
        let mut events = self.event_repo.list_for_user(&caller).await?;
        events.sort_by(|a, b| {
            a.person_id
                .cmp(&b.person_id)
                .then_with(|| a.chronological_cmp(b))
        });
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockAuthRepo, MockEventRepo, MockPersonRepo};
    use famtree_domain::{EventType, Gender, Location, PersonName};

    fn username(name: &str) -> Username {
        Username::new(name).expect("valid")
    }

    fn auth_for(name: &'static str) -> MockAuthRepo {
        let mut auth = MockAuthRepo::new();
        auth.expect_resolve_user().returning(move |token| {
            Ok((token == "good-token").then(|| username(name)))
        });
        auth
    }

    fn person(owner: &str) -> Person {
        Person::new(
            PersonId::new(),
            username(owner),
            PersonName::new("Lisa", "Simpson").expect("valid"),
            Gender::Female,
        )
    }

    fn event(owner: &str, person_id: PersonId, event_type: EventType, year: i32) -> Event {
        Event::new(
            EventId::new(),
            username(owner),
            person_id,
            Location::new("USA", "Springfield", 39.78, -89.65).expect("valid"),
            event_type,
            year,
        )
    }

    #[tokio::test]
    async fn when_token_unknown_returns_invalid_credential() {
        let lookup = PersonLookup::new(Arc::new(auth_for("lisa")), Arc::new(MockPersonRepo::new()));
        let result = lookup.list("bad-token").await;
        assert!(matches!(result, Err(LookupError::InvalidCredential)));
    }

    #[tokio::test]
    async fn when_token_blank_skips_auth_store() {
        let lookup = PersonLookup::new(
            Arc::new(MockAuthRepo::new()),
            Arc::new(MockPersonRepo::new()),
        );
        let result = lookup.get("  ", PersonId::new()).await;
        assert!(matches!(result, Err(LookupError::InvalidCredential)));
    }

    #[tokio::test]
    async fn when_person_missing_returns_not_found() {
        let mut person_repo = MockPersonRepo::new();
        person_repo.expect_get().returning(|_| Ok(None));

        let lookup = PersonLookup::new(Arc::new(auth_for("lisa")), Arc::new(person_repo));
        let result = lookup.get("good-token", PersonId::new()).await;
        assert!(matches!(result, Err(LookupError::NotFound(_))));
    }

    #[tokio::test]
    async fn when_person_foreign_returns_forbidden() {
        let stranger = person("bart");
        let id = stranger.id;
        let mut person_repo = MockPersonRepo::new();
        person_repo
            .expect_get()
            .withf(move |requested| *requested == id)
            .returning(move |_| Ok(Some(stranger.clone())));

        let lookup = PersonLookup::new(Arc::new(auth_for("lisa")), Arc::new(person_repo));
        let result = lookup.get("good-token", id).await;
        assert!(matches!(result, Err(LookupError::Forbidden(_))));
    }

    #[tokio::test]
    async fn own_person_is_returned() {
        let own = person("lisa");
        let expected = own.clone();
        let mut person_repo = MockPersonRepo::new();
        person_repo
            .expect_get()
            .returning(move |_| Ok(Some(own.clone())));

        let lookup = PersonLookup::new(Arc::new(auth_for("lisa")), Arc::new(person_repo));
        let found = lookup.get("good-token", expected.id).await.expect("found");
        assert_eq!(found, expected);
    }

    #[tokio::test]
    async fn list_persons_uses_caller() {
        let mut person_repo = MockPersonRepo::new();
        person_repo
            .expect_list_for_user()
            .withf(|user| user.as_str() == "lisa")
            .returning(|_| Ok(vec![person("lisa"), person("lisa")]));

        let lookup = PersonLookup::new(Arc::new(auth_for("lisa")), Arc::new(person_repo));
        assert_eq!(lookup.list("good-token").await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn when_event_foreign_returns_forbidden() {
        let foreign = event("bart", PersonId::new(), EventType::Birth, 1980);
        let mut event_repo = MockEventRepo::new();
        event_repo
            .expect_get()
            .returning(move |_| Ok(Some(foreign.clone())));

        let lookup = EventLookup::new(Arc::new(auth_for("lisa")), Arc::new(event_repo));
        let result = lookup.get("good-token", EventId::new()).await;
        assert!(matches!(result, Err(LookupError::Forbidden(_))));
    }

    #[tokio::test]
    async fn list_events_groups_by_person_in_life_order() {
        let a = PersonId::new();
        let b = PersonId::new();
        let stored = vec![
            event("lisa", a, EventType::Death, 1990),
            event("lisa", b, EventType::Marriage, 1950),
            event("lisa", a, EventType::Birth, 1920),
            event("lisa", b, EventType::Birth, 1925),
            event("lisa", a, EventType::Marriage, 1945),
        ];
        let mut event_repo = MockEventRepo::new();
        event_repo
            .expect_list_for_user()
            .returning(move |_| Ok(stored.clone()));

        let lookup = EventLookup::new(Arc::new(auth_for("lisa")), Arc::new(event_repo));
        let events = lookup.list("good-token").await.expect("list");

        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let order: Vec<_> = events.iter().map(|e| (e.person_id, e.event_type)).collect();
        let expected_for = |id: PersonId| {
            if id == a {
                vec![
                    (a, EventType::Birth),
                    (a, EventType::Marriage),
                    (a, EventType::Death),
                ]
            } else {
                vec![(b, EventType::Birth), (b, EventType::Marriage)]
            }
        };
        let mut expected = expected_for(first);
        expected.extend(expected_for(second));
        assert_eq!(order, expected);
    }
}
