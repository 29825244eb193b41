//! AncestorTree aggregate - one user's generated family tree
//!
//! The tree is an arena: persons live in a flat `Vec` and refer to each other
//! by `PersonId`. Builders address persons through [`TreeSlot`] while the tree
//! grows, and the finished tree hands its parts over for bulk persistence.

use std::collections::{HashMap, HashSet};

use crate::entities::{Event, EventType, Gender, Person};
use crate::error::DomainError;
use crate::ids::PersonId;
use crate::value_objects::{Generations, LifeYears, Username};

/// Position of a person inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeSlot {
    Root,
    Ancestor(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AncestorTree {
    root: Person,
    ancestors: Vec<Person>,
    events: Vec<Event>,
}

impl AncestorTree {
    /// Start a tree at `root`. Any lineage the root carried from an older
    /// tree is dropped.
    pub fn new(mut root: Person) -> Self {
        root.clear_parents();
        Self {
            root,
            ancestors: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn root(&self) -> &Person {
        &self.root
    }

    pub fn username(&self) -> &Username {
        &self.root.username
    }

    pub fn ancestors(&self) -> &[Person] {
        &self.ancestors
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn person(&self, slot: TreeSlot) -> Option<&Person> {
        match slot {
            TreeSlot::Root => Some(&self.root),
            TreeSlot::Ancestor(index) => self.ancestors.get(index),
        }
    }

    fn person_mut(&mut self, slot: TreeSlot) -> Option<&mut Person> {
        match slot {
            TreeSlot::Root => Some(&mut self.root),
            TreeSlot::Ancestor(index) => self.ancestors.get_mut(index),
        }
    }

    /// Attach `father` and `mother` as the parents of the person at `child`,
    /// marrying them to each other.
    ///
    /// Returns the slots of the new father and mother.
    pub fn add_parents(
        &mut self,
        child: TreeSlot,
        mut father: Person,
        mut mother: Person,
    ) -> Result<(TreeSlot, TreeSlot), DomainError> {
        if father.gender != Gender::Male || mother.gender != Gender::Female {
            return Err(DomainError::constraint(
                "fathers must be 'm' and mothers must be 'f'",
            ));
        }
        if &father.username != self.username() || &mother.username != self.username() {
            return Err(DomainError::constraint(format!(
                "parents must belong to {}",
                self.username()
            )));
        }
        Person::marry(&mut father, &mut mother)?;

        let child = self
            .person_mut(child)
            .ok_or_else(|| DomainError::constraint(format!("no person at {:?}", child)))?;
        child.set_parents(&father, &mother);

        let father_slot = TreeSlot::Ancestor(self.ancestors.len());
        self.ancestors.push(father);
        let mother_slot = TreeSlot::Ancestor(self.ancestors.len());
        self.ancestors.push(mother);
        Ok((father_slot, mother_slot))
    }

    pub fn add_events(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn person_count(&self) -> usize {
        self.ancestors.len() + 1
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Check every structural and chronological invariant of a finished
    /// tree of depth `generations`.
    pub fn verify(&self, generations: Generations) -> Result<(), DomainError> {
        let expected_persons = generations.person_count();
        let expected_events = generations.event_count();
        if self.person_count() as u64 != expected_persons
            || self.event_count() as u64 != expected_events
        {
            return Err(DomainError::constraint(format!(
                "expected {} persons and {} events, found {} and {}",
                expected_persons,
                expected_events,
                self.person_count(),
                self.event_count()
            )));
        }

        let mut persons: HashMap<PersonId, &Person> = HashMap::new();
        for person in std::iter::once(&self.root).chain(self.ancestors.iter()) {
            if &person.username != self.username() {
                return Err(DomainError::constraint(format!(
                    "person {} belongs to {}, not {}",
                    person.id,
                    person.username,
                    self.username()
                )));
            }
            if persons.insert(person.id, person).is_some() {
                return Err(DomainError::constraint(format!(
                    "duplicate person id {}",
                    person.id
                )));
            }
        }

        let mut years: HashMap<PersonId, HashMap<EventType, i32>> = HashMap::new();
        let mut event_ids = HashSet::new();
        for event in &self.events {
            if !event_ids.insert(event.id) {
                return Err(DomainError::constraint(format!(
                    "duplicate event id {}",
                    event.id
                )));
            }
            if !persons.contains_key(&event.person_id) {
                return Err(DomainError::constraint(format!(
                    "event {} refers to unknown person {}",
                    event.id, event.person_id
                )));
            }
            let by_type = years.entry(event.person_id).or_default();
            if by_type.insert(event.event_type, event.year).is_some() {
                return Err(DomainError::constraint(format!(
                    "person {} has more than one {} event",
                    event.person_id, event.event_type
                )));
            }
        }

        for person in persons.values() {
            let Some(birth) = years
                .get(&person.id)
                .and_then(|by_type| by_type.get(&EventType::Birth))
                .copied()
            else {
                return Err(DomainError::constraint(format!(
                    "person {} has no birth event",
                    person.id
                )));
            };

            let (Some(father_id), Some(mother_id)) = (person.father_id, person.mother_id) else {
                if person.father_id.is_some() || person.mother_id.is_some() {
                    return Err(DomainError::constraint(format!(
                        "person {} has only one parent",
                        person.id
                    )));
                }
                continue;
            };

            for (parent_id, gender, spouse_id) in [
                (father_id, Gender::Male, mother_id),
                (mother_id, Gender::Female, father_id),
            ] {
                let parent = persons.get(&parent_id).ok_or_else(|| {
                    DomainError::constraint(format!("missing parent {}", parent_id))
                })?;
                if parent.gender != gender {
                    return Err(DomainError::constraint(format!(
                        "parent {} has gender {}, expected {}",
                        parent.id, parent.gender, gender
                    )));
                }
                if parent.spouse_id != Some(spouse_id) {
                    return Err(DomainError::constraint(format!(
                        "parent {} is not married to {}",
                        parent.id, spouse_id
                    )));
                }
                life_years(parent.id, &years)?.validate(birth)?;
            }

            let father_married = life_years(father_id, &years)?.marriage;
            let mother_married = life_years(mother_id, &years)?.marriage;
            if father_married != mother_married {
                return Err(DomainError::constraint(format!(
                    "parents of {} married in {} and {}",
                    person.id, father_married, mother_married
                )));
            }
        }

        Ok(())
    }
}

fn life_years(
    id: PersonId,
    years: &HashMap<PersonId, HashMap<EventType, i32>>,
) -> Result<LifeYears, DomainError> {
    let by_type = years
        .get(&id)
        .ok_or_else(|| DomainError::constraint(format!("person {} has no events", id)))?;
    let year = |event_type: EventType| {
        by_type.get(&event_type).copied().ok_or_else(|| {
            DomainError::constraint(format!("person {} has no {} event", id, event_type))
        })
    };
    Ok(LifeYears {
        birth: year(EventType::Birth)?,
        marriage: year(EventType::Marriage)?,
        death: year(EventType::Death)?,
    })
}
