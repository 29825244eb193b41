//! Creation of life events.

use std::sync::Arc;

use famtree_domain::{Event, EventId, EventType, LifeYears, Person};

use crate::infrastructure::ports::{NameLocationPort, ProviderError, RandomPort};

#[derive(Clone)]
pub struct EventFactory {
    locations: Arc<dyn NameLocationPort>,
    random: Arc<dyn RandomPort>,
}

impl EventFactory {
    pub fn new(locations: Arc<dyn NameLocationPort>, random: Arc<dyn RandomPort>) -> Self {
        Self { locations, random }
    }

    fn event(
        &self,
        person: &Person,
        event_type: EventType,
        year: i32,
    ) -> Result<Event, ProviderError> {
        Ok(Event::new(
            EventId::from_uuid(self.random.gen_uuid()),
            person.username.clone(),
            person.id,
            self.locations.random_location()?,
            event_type,
            year,
        ))
    }

    /// Birth, marriage and death of a synthetic person. Each event gets its
    /// own location.
    pub fn life_events(
        &self,
        person: &Person,
        years: &LifeYears,
    ) -> Result<[Event; 3], ProviderError> {
        Ok([
            self.event(person, EventType::Birth, years.birth)?,
            self.event(person, EventType::Marriage, years.marriage)?,
            self.event(person, EventType::Death, years.death)?,
        ])
    }

    /// The root only ever gets a birth event.
    pub fn birth_only(&self, root: &Person, year: i32) -> Result<Event, ProviderError> {
        self.event(root, EventType::Birth, year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SeededRandom;
    use crate::infrastructure::ports::MockNameLocationPort;
    use famtree_domain::{Gender, Location, PersonId, PersonName, Username};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn person() -> Person {
        Person::new(
            PersonId::new(),
            Username::new("oscar").expect("valid"),
            PersonName::new("Oscar", "Wilde").expect("valid"),
            Gender::Male,
        )
    }

    fn counting_locations() -> MockNameLocationPort {
        let calls = AtomicUsize::new(0);
        let mut locations = MockNameLocationPort::new();
        locations.expect_random_location().returning(move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Location::new(format!("Country {}", n), "City", 0.0, 0.0)
                .map_err(|e| ProviderError::InvalidEntry(e.to_string()))
        });
        locations
    }

    #[test]
    fn life_events_carry_years_and_owner() {
        let factory = EventFactory::new(
            Arc::new(counting_locations()),
            Arc::new(SeededRandom::new(2)),
        );
        let person = person();
        let years = LifeYears {
            birth: 1900,
            marriage: 1925,
            death: 1970,
        };

        let [birth, marriage, death] = factory.life_events(&person, &years).expect("events");

        assert_eq!((birth.event_type, birth.year), (EventType::Birth, 1900));
        assert_eq!(
            (marriage.event_type, marriage.year),
            (EventType::Marriage, 1925)
        );
        assert_eq!((death.event_type, death.year), (EventType::Death, 1970));
        for event in [&birth, &marriage, &death] {
            assert_eq!(event.person_id, person.id);
            assert_eq!(event.username, person.username);
        }
    }

    #[test]
    fn each_event_draws_its_own_location() {
        let factory = EventFactory::new(
            Arc::new(counting_locations()),
            Arc::new(SeededRandom::new(2)),
        );
        let years = LifeYears {
            birth: 1900,
            marriage: 1925,
            death: 1970,
        };
        let events = factory.life_events(&person(), &years).expect("events");
        assert_ne!(events[0].location, events[1].location);
        assert_ne!(events[1].location, events[2].location);
        assert_ne!(events[0].id, events[1].id);
    }

    #[test]
    fn birth_only_creates_single_birth() {
        let factory = EventFactory::new(
            Arc::new(counting_locations()),
            Arc::new(SeededRandom::new(2)),
        );
        let event = factory.birth_only(&person(), 1990).expect("birth");
        assert_eq!(event.event_type, EventType::Birth);
        assert_eq!(event.year, 1990);
    }

    #[test]
    fn location_failure_is_passed_through() {
        let mut locations = MockNameLocationPort::new();
        locations
            .expect_random_location()
            .returning(|| Err(ProviderError::Unavailable("offline".into())));
        let factory = EventFactory::new(Arc::new(locations), Arc::new(SeededRandom::new(2)));
        assert!(matches!(
            factory.birth_only(&person(), 1990),
            Err(ProviderError::Unavailable(_))
        ));
    }
}
