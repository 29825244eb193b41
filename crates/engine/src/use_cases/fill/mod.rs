//! Fill use case.
//!
//! Replaces a user's generated ancestor tree with a freshly built one:
//! validate the depth, resolve the root person, build the tree in memory and
//! swap it into storage in one transaction.

mod builder;
mod error;
mod event_factory;
mod person_factory;

use std::sync::Arc;

use chrono::Datelike;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use famtree_domain::{root_birth_year, DomainError, Generations, Person, Username};

use crate::infrastructure::ports::{ClockPort, PersonRepo, RandomPort, TreeRepo};

pub use builder::TreeBuilder;
pub use error::FillError;
pub use event_factory::EventFactory;
pub use person_factory::PersonFactory;

/// Counts of what a successful fill stored, root included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillSummary {
    pub person_count: usize,
    pub event_count: usize,
}

/// Result of a fill as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillOutcome {
    pub success: bool,
    pub person_count: usize,
    pub event_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FillOutcome {
    pub fn from_result(result: &Result<FillSummary, FillError>) -> Self {
        match result {
            Ok(summary) => Self {
                success: true,
                person_count: summary.person_count,
                event_count: summary.event_count,
                message: Some(format!(
                    "Successfully added {} persons and {} events to the database.",
                    summary.person_count, summary.event_count
                )),
            },
            Err(e) => Self {
                success: false,
                person_count: 0,
                event_count: 0,
                message: Some(e.to_string()),
            },
        }
    }
}

/// Parse a generation count given as text, such as a path segment.
pub fn parse_generations(raw: &str) -> Result<i64, FillError> {
    raw.trim().parse().map_err(|_| {
        FillError::InvalidArgument(DomainError::validation(format!(
            "Generations must be a whole number, got '{}'",
            raw
        )))
    })
}

/// Container for fill use cases.
pub struct FillUseCases {
    pub fill: Arc<FillTree>,
}

impl FillUseCases {
    pub fn new(fill: Arc<FillTree>) -> Self {
        Self { fill }
    }
}

/// Handle on a username's fill lock. Dropping the last handle removes the
/// map entry, so the map only holds usernames with a fill in flight.
struct UserLock<'a> {
    locks: &'a DashMap<Username, Arc<Mutex<()>>>,
    username: Username,
    lock: Arc<Mutex<()>>,
}

impl Drop for UserLock<'_> {
    fn drop(&mut self) {
        // Two references left means the map's and this handle's.
        self.locks.remove_if(&self.username, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}

/// Fill use case.
///
/// Fills for the same username run one at a time; different usernames do
/// not wait on each other.
pub struct FillTree {
    person_repo: Arc<dyn PersonRepo>,
    tree_repo: Arc<dyn TreeRepo>,
    builder: TreeBuilder,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
    locks: DashMap<Username, Arc<Mutex<()>>>,
}

impl FillTree {
    pub fn new(
        person_repo: Arc<dyn PersonRepo>,
        tree_repo: Arc<dyn TreeRepo>,
        builder: TreeBuilder,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            person_repo,
            tree_repo,
            builder,
            clock,
            random,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, username: &Username) -> UserLock<'_> {
        let lock = self
            .locks
            .entry(username.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        UserLock {
            locks: &self.locks,
            username: username.clone(),
            lock,
        }
    }

    /// Usernames with a fill running or queued.
    #[cfg(test)]
    fn active_locks(&self) -> usize {
        self.locks.len()
    }

    /// Execute the fill use case.
    ///
    /// # Arguments
    /// * `username` - Owner of the root person the tree grows from
    /// * `generations` - Requested depth; negative or too large is rejected
    ///
    /// # Returns
    /// * `Ok(FillSummary)` - The new tree is stored and the old one is gone
    /// * `Err(FillError)` - Nothing changed in storage
    pub async fn execute(
        &self,
        username: &Username,
        generations: i64,
    ) -> Result<FillSummary, FillError> {
        let generations = Generations::new(generations).map_err(FillError::InvalidArgument)?;

        let root = self
            .person_repo
            .find_root(username)
            .await?
            .ok_or_else(|| FillError::UserNotFound(username.clone()))?;

        let user_lock = self.lock_for(username);
        let _guard = user_lock.lock.lock().await;
        self.build_and_store(root, generations).await
    }

    async fn build_and_store(
        &self,
        root: Person,
        generations: Generations,
    ) -> Result<FillSummary, FillError> {
        let username = root.username.clone();
        let current_year = self.clock.now().year();
        let root_birth = root_birth_year(current_year, |min, max| self.random.gen_range(min, max));
        tracing::debug!(
            username = %username,
            generations = generations.get(),
            root_birth,
            "Building ancestor tree"
        );

        let tree = self
            .builder
            .build_ancestors(root, root_birth, generations)?;
        tree.verify(generations)
            .map_err(FillError::InconsistentTree)?;

        self.tree_repo.replace_tree(&tree).await?;

        Ok(FillSummary {
            person_count: tree.person_count(),
            event_count: tree.event_count(),
        })
    }

    /// Run a fill for a raw username. The result is logged before it is
    /// returned.
    pub async fn run(&self, username: &str, generations: i64) -> Result<FillSummary, FillError> {
        let result = match Username::new(username) {
            Ok(username) => self.execute(&username, generations).await,
            Err(e) => Err(FillError::InvalidArgument(e)),
        };

        match &result {
            Ok(summary) => tracing::info!(
                username = %username,
                generations,
                persons = summary.person_count,
                events = summary.event_count,
                "Fill completed"
            ),
            Err(e) => tracing::warn!(
                username = %username,
                generations,
                error = %e,
                "Fill failed"
            ),
        }

        result
    }

    /// Run a fill and report the outcome. Failures are carried in the
    /// outcome's message.
    pub async fn fill(&self, username: &str, generations: i64) -> FillOutcome {
        let result = self.run(username, generations).await;
        FillOutcome::from_result(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, SeededRandom};
    use crate::infrastructure::names::JsonNameLocationProvider;
    use crate::infrastructure::ports::{
        MockNameLocationPort, MockPersonRepo, MockTreeRepo, NameLocationPort, ProviderError,
        RepoError,
    };
    use chrono::{TimeZone, Utc};
    use famtree_domain::{EventType, Gender, Person, PersonId, PersonName};

    fn username() -> Username {
        Username::new("marge").expect("valid")
    }

    fn root() -> Person {
        Person::new(
            PersonId::new(),
            username(),
            PersonName::new("Marge", "Bouvier").expect("valid"),
            Gender::Female,
        )
    }

    fn clock() -> Arc<dyn ClockPort> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0)
                .single()
                .expect("valid date"),
        ))
    }

    fn builder_with(provider: Arc<dyn NameLocationPort>, random: Arc<dyn RandomPort>) -> TreeBuilder {
        TreeBuilder::new(
            PersonFactory::new(provider.clone(), random.clone()),
            EventFactory::new(provider, random.clone()),
            random,
        )
    }

    fn use_case(person_repo: MockPersonRepo, tree_repo: MockTreeRepo) -> FillTree {
        let random: Arc<dyn RandomPort> = Arc::new(SeededRandom::new(11));
        let provider: Arc<dyn NameLocationPort> =
            Arc::new(JsonNameLocationProvider::embedded(random.clone()).expect("dataset"));
        FillTree::new(
            Arc::new(person_repo),
            Arc::new(tree_repo),
            builder_with(provider, random.clone()),
            clock(),
            random,
        )
    }

    fn repo_with_root() -> MockPersonRepo {
        let mut person_repo = MockPersonRepo::new();
        let root = root();
        person_repo
            .expect_find_root()
            .returning(move |_| Ok(Some(root.clone())));
        person_repo
    }

    #[tokio::test]
    async fn when_generations_negative_returns_invalid_argument() {
        // No expectations: any repo call fails the test.
        let use_case = use_case(MockPersonRepo::new(), MockTreeRepo::new());
        let result = use_case.execute(&username(), -1).await;
        assert!(matches!(result, Err(FillError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn when_generations_too_large_returns_invalid_argument() {
        let use_case = use_case(MockPersonRepo::new(), MockTreeRepo::new());
        let result = use_case.execute(&username(), 21).await;
        assert!(matches!(result, Err(FillError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn when_user_unknown_returns_user_not_found() {
        let mut person_repo = MockPersonRepo::new();
        person_repo.expect_find_root().returning(|_| Ok(None));

        let use_case = use_case(person_repo, MockTreeRepo::new());
        let result = use_case.execute(&username(), 2).await;
        assert!(matches!(result, Err(FillError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn when_provider_fails_nothing_is_stored() {
        let random: Arc<dyn RandomPort> = Arc::new(SeededRandom::new(3));
        let mut provider = MockNameLocationPort::new();
        provider
            .expect_random_location()
            .returning(|| Err(ProviderError::Unavailable("dataset missing".into())));
        provider
            .expect_random_name()
            .returning(|_| Err(ProviderError::Unavailable("dataset missing".into())));

        let use_case = FillTree::new(
            Arc::new(repo_with_root()),
            Arc::new(MockTreeRepo::new()),
            builder_with(Arc::new(provider), random.clone()),
            clock(),
            random,
        );
        let result = use_case.execute(&username(), 1).await;
        assert!(matches!(result, Err(FillError::Provider(_))));
    }

    #[tokio::test]
    async fn when_storage_fails_returns_persistence_error() {
        let mut tree_repo = MockTreeRepo::new();
        tree_repo
            .expect_replace_tree()
            .times(1)
            .returning(|_| Err(RepoError::database("replace_tree", "disk full")));

        let use_case = use_case(repo_with_root(), tree_repo);
        let outcome = use_case.fill("marge", 2).await;

        assert!(!outcome.success);
        assert_eq!(outcome.person_count, 0);
        assert!(outcome
            .message
            .as_deref()
            .is_some_and(|m| m.contains("disk full")));
    }

    #[tokio::test]
    async fn stores_whole_tree_in_one_replace() {
        let mut tree_repo = MockTreeRepo::new();
        tree_repo
            .expect_replace_tree()
            .withf(|tree| tree.person_count() == 7 && tree.event_count() == 19)
            .times(1)
            .returning(|_| Ok(()));

        let use_case = use_case(repo_with_root(), tree_repo);
        let summary = use_case.execute(&username(), 2).await.expect("fill");
        assert_eq!(
            summary,
            FillSummary {
                person_count: 7,
                event_count: 19
            }
        );
    }

    #[tokio::test]
    async fn root_birth_is_18_to_60_years_before_now() {
        let mut tree_repo = MockTreeRepo::new();
        tree_repo
            .expect_replace_tree()
            .withf(|tree| {
                let birth = tree
                    .events()
                    .iter()
                    .find(|e| e.person_id == tree.root().id)
                    .filter(|e| e.event_type == EventType::Birth)
                    .map(|e| e.year);
                matches!(birth, Some(year) if (2026 - 60..=2026 - 18).contains(&year))
            })
            .returning(|_| Ok(()));

        let use_case = use_case(repo_with_root(), tree_repo);
        use_case.execute(&username(), 0).await.expect("fill");
    }

    #[tokio::test]
    async fn outcome_message_reports_counts() {
        let mut tree_repo = MockTreeRepo::new();
        tree_repo.expect_replace_tree().returning(|_| Ok(()));

        let use_case = use_case(repo_with_root(), tree_repo);
        let outcome = use_case.fill("marge", 0).await;

        assert_eq!(
            outcome,
            FillOutcome {
                success: true,
                person_count: 1,
                event_count: 1,
                message: Some(
                    "Successfully added 1 persons and 1 events to the database.".to_string()
                ),
            }
        );
    }

    #[tokio::test]
    async fn blank_username_is_rejected() {
        let use_case = use_case(MockPersonRepo::new(), MockTreeRepo::new());
        let outcome = use_case.fill("   ", 2).await;
        assert!(!outcome.success);
    }

    #[test]
    fn outcome_serializes_camel_case() {
        let outcome = FillOutcome::from_result(&Ok(FillSummary {
            person_count: 7,
            event_count: 19,
        }));
        let json = serde_json::to_value(&outcome).expect("serialize");
        assert_eq!(json["personCount"], 7);
        assert_eq!(json["eventCount"], 19);
        assert_eq!(json["success"], true);
    }

    #[test]
    fn generations_parse_from_text() {
        assert_eq!(parse_generations("3").expect("number"), 3);
        assert_eq!(parse_generations(" -1 ").expect("number"), -1);
        for raw in ["three", "", "2.5", "99999999999999999999"] {
            let err = parse_generations(raw).expect_err("should fail");
            assert!(matches!(err, FillError::InvalidArgument(_)), "{}", raw);
            assert!(err.is_rejection());
        }
    }

    #[test]
    fn only_bad_requests_are_rejections() {
        assert!(FillError::UserNotFound(username()).is_rejection());
        assert!(!FillError::Persistence(RepoError::database("replace_tree", "io")).is_rejection());
        assert!(!FillError::Provider(ProviderError::Empty("cities")).is_rejection());
    }

    #[tokio::test]
    async fn lock_entries_are_released_after_fills() {
        let mut tree_repo = MockTreeRepo::new();
        let mut calls = 0;
        tree_repo.expect_replace_tree().returning(move |_| {
            calls += 1;
            if calls == 2 {
                Err(RepoError::database("replace_tree", "busy"))
            } else {
                Ok(())
            }
        });

        let use_case = use_case(repo_with_root(), tree_repo);
        let (a, b) = tokio::join!(use_case.fill("marge", 1), use_case.fill("marge", 1));
        assert!(a.success != b.success);
        assert!(use_case.fill("marge", 0).await.success);
        assert!(!use_case.fill("marge", -1).await.success);

        assert_eq!(use_case.active_locks(), 0);
    }
}
