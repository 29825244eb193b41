//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    ports::{AuthRepo, ClockPort, EventRepo, NameLocationPort, PersonRepo, RandomPort, TreeRepo},
    sqlite::SqliteFamilyStore,
};
use crate::use_cases::{
    self,
    fill::{EventFactory, FillTree, PersonFactory, TreeBuilder},
    lookup::{EventLookup, PersonLookup},
};

/// Main application state.
///
/// Holds all repository ports and use cases.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
    pub default_generations: i64,
}

/// Container for all repository ports.
pub struct Repositories {
    pub person: Arc<dyn PersonRepo>,
    pub event: Arc<dyn EventRepo>,
    pub tree: Arc<dyn TreeRepo>,
    pub auth: Arc<dyn AuthRepo>,
}

impl Repositories {
    /// Every port backed by the same SQLite store.
    pub fn from_store(store: Arc<SqliteFamilyStore>) -> Self {
        Self {
            person: store.clone(),
            event: store.clone(),
            tree: store.clone(),
            auth: store,
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub fill: use_cases::FillUseCases,
    pub lookup: use_cases::LookupUseCases,
    pub clear: Arc<use_cases::ClearStore>,
    pub load: Arc<use_cases::LoadStore>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        repositories: Repositories,
        names: Arc<dyn NameLocationPort>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        default_generations: i64,
    ) -> Self {
        let builder = TreeBuilder::new(
            PersonFactory::new(names.clone(), random.clone()),
            EventFactory::new(names, random.clone()),
            random.clone(),
        );
        let fill = use_cases::FillUseCases::new(Arc::new(FillTree::new(
            repositories.person.clone(),
            repositories.tree.clone(),
            builder,
            clock,
            random,
        )));

        let lookup = use_cases::LookupUseCases::new(
            Arc::new(PersonLookup::new(
                repositories.auth.clone(),
                repositories.person.clone(),
            )),
            Arc::new(EventLookup::new(
                repositories.auth.clone(),
                repositories.event.clone(),
            )),
        );

        let clear = Arc::new(use_cases::ClearStore::new(repositories.tree.clone()));
        let load = Arc::new(use_cases::LoadStore::new(repositories.tree.clone()));

        Self {
            repositories,
            use_cases: UseCases {
                fill,
                lookup,
                clear,
                load,
            },
            default_generations,
        }
    }
}
