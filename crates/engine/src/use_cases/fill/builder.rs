//! Recursive construction of an ancestor tree.

use std::sync::Arc;

use famtree_domain::{AncestorTree, CoupleYears, Gender, Generations, Person, TreeSlot};

use super::error::FillError;
use super::event_factory::EventFactory;
use super::person_factory::PersonFactory;
use crate::infrastructure::ports::RandomPort;

/// Grows the ancestor binary tree above a root person, depth-first and
/// father before mother.
#[derive(Clone)]
pub struct TreeBuilder {
    persons: PersonFactory,
    events: EventFactory,
    random: Arc<dyn RandomPort>,
}

impl TreeBuilder {
    pub fn new(persons: PersonFactory, events: EventFactory, random: Arc<dyn RandomPort>) -> Self {
        Self {
            persons,
            events,
            random,
        }
    }

    /// Build `generations` levels of ancestors above `root`, who was born in
    /// `root_birth_year`.
    ///
    /// The result holds `2^(G+1) - 2` ancestors, three events for each of
    /// them and a single birth event for the root.
    pub fn build_ancestors(
        &self,
        root: Person,
        root_birth_year: i32,
        generations: Generations,
    ) -> Result<AncestorTree, FillError> {
        let mut tree = AncestorTree::new(root);
        let birth = self.events.birth_only(tree.root(), root_birth_year)?;
        tree.add_events([birth]);

        self.add_parents(&mut tree, TreeSlot::Root, root_birth_year, generations.get())?;
        Ok(tree)
    }

    fn add_parents(
        &self,
        tree: &mut AncestorTree,
        child: TreeSlot,
        child_birth: i32,
        remaining: u32,
    ) -> Result<(), FillError> {
        if remaining == 0 {
            return Ok(());
        }

        let username = tree.username().clone();
        let father = self.persons.create_ancestor(&username, Gender::Male)?;
        let mother = self.persons.create_ancestor(&username, Gender::Female)?;

        let years = CoupleYears::draw(child_birth, |min, max| self.random.gen_range(min, max));
        years
            .validate(child_birth)
            .map_err(FillError::InconsistentTree)?;

        let father_events = self.events.life_events(&father, &years.father)?;
        let mother_events = self.events.life_events(&mother, &years.mother)?;

        let (father_slot, mother_slot) = tree
            .add_parents(child, father, mother)
            .map_err(FillError::InconsistentTree)?;
        tree.add_events(father_events);
        tree.add_events(mother_events);

        self.add_parents(tree, father_slot, years.father.birth, remaining - 1)?;
        self.add_parents(tree, mother_slot, years.mother.birth, remaining - 1)
    }
}
