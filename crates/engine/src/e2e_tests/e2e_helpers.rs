//! E2E test helpers for constructing the full application stack.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use famtree_domain::{Event, EventType, Gender, Person, PersonId, PersonName, Username};
use tempfile::TempDir;

use crate::app::{App, Repositories};
use crate::infrastructure::clock::{FixedClock, SeededRandom};
use crate::infrastructure::names::JsonNameLocationProvider;
use crate::infrastructure::ports::{EventRepo, PersonRepo, RandomPort};
use crate::infrastructure::sqlite::SqliteFamilyStore;

/// Year the fixed test clock reports.
pub const TEST_YEAR: i32 = 2026;

/// A store in a temp directory plus an App wired against it.
pub struct E2EContext {
    _dir: TempDir,
    pub store: Arc<SqliteFamilyStore>,
    pub app: App,
}

impl E2EContext {
    pub async fn new(seed: u64) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("e2e.db");
        let store = Arc::new(
            SqliteFamilyStore::new(path.to_str().expect("utf-8 path"))
                .await
                .expect("store"),
        );
        let app = app_for(store.clone(), seed);
        Self {
            _dir: dir,
            store,
            app,
        }
    }

    /// Another App over the same store with its own random sequence.
    pub fn app_with_seed(&self, seed: u64) -> App {
        app_for(self.store.clone(), seed)
    }

    /// Register a user the way the registration service would: a root
    /// person row and a user row.
    pub async fn register(&self, name: &str, gender: Gender) -> Person {
        let root = Person::new(
            PersonId::new(),
            Username::new(name).expect("valid username"),
            PersonName::new(name, "Root").expect("valid name"),
            gender,
        );
        self.store.save_root(&root).await.expect("save root");
        root
    }

    pub async fn stored(&self, name: &str) -> StoredTree {
        let username = Username::new(name).expect("valid username");
        StoredTree {
            persons: PersonRepo::list_for_user(self.store.as_ref(), &username)
                .await
                .expect("persons"),
            events: EventRepo::list_for_user(self.store.as_ref(), &username)
                .await
                .expect("events"),
        }
    }
}

fn app_for(store: Arc<SqliteFamilyStore>, seed: u64) -> App {
    let random: Arc<dyn RandomPort> = Arc::new(SeededRandom::new(seed));
    let names = Arc::new(JsonNameLocationProvider::embedded(random.clone()).expect("dataset"));
    let clock = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(TEST_YEAR, 3, 15, 12, 0, 0)
            .single()
            .expect("valid date"),
    ));
    App::new(Repositories::from_store(store), names, clock, random, 4)
}

/// Everything stored for one user.
pub struct StoredTree {
    pub persons: Vec<Person>,
    pub events: Vec<Event>,
}

impl StoredTree {
    pub fn years(&self) -> HashMap<PersonId, HashMap<EventType, i32>> {
        let mut years: HashMap<PersonId, HashMap<EventType, i32>> = HashMap::new();
        for event in &self.events {
            years
                .entry(event.person_id)
                .or_default()
                .insert(event.event_type, event.year);
        }
        years
    }

    /// Assert every genealogical and chronological property of a stored tree.
    pub fn assert_consistent(&self, root: &Person) {
        let by_id: HashMap<PersonId, &Person> = self.persons.iter().map(|p| (p.id, p)).collect();
        assert_eq!(by_id.len(), self.persons.len(), "person ids are unique");
        let years = self.years();

        for person in &self.persons {
            assert_eq!(person.username, root.username);
            let own = years.get(&person.id).expect("every person has events");
            let birth = own[&EventType::Birth];

            if person.id == root.id {
                assert_eq!(own.len(), 1, "root only has a birth");
                assert!((TEST_YEAR - 60..=TEST_YEAR - 18).contains(&birth));
            } else {
                assert_eq!(own.len(), 3, "ancestors have three events");
                let marriage = own[&EventType::Marriage];
                let death = own[&EventType::Death];
                assert!(death - birth > 18 && death - birth < 110);
                assert!(marriage - birth >= 18);
                assert!(death > marriage);
            }

            assert_eq!(person.father_id.is_some(), person.mother_id.is_some());
            if let (Some(father_id), Some(mother_id)) = (person.father_id, person.mother_id) {
                let father = by_id[&father_id];
                let mother = by_id[&mother_id];
                assert_eq!(father.gender, Gender::Male);
                assert_eq!(mother.gender, Gender::Female);
                assert_eq!(father.spouse_id, Some(mother_id));
                assert_eq!(mother.spouse_id, Some(father_id));
                assert!(birth - years[&father_id][&EventType::Birth] > 18);
                assert!(birth - years[&mother_id][&EventType::Birth] > 18);
                assert_eq!(
                    years[&father_id][&EventType::Marriage],
                    years[&mother_id][&EventType::Marriage]
                );
            }
        }
    }
}
