//! Event entity - A dated, located moment in a person's life

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::ids::{EventId, PersonId};
use crate::value_objects::{Location, Username};

/// Kind of life event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Birth,
    Marriage,
    Death,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Birth => "birth",
            Self::Marriage => "marriage",
            Self::Death => "death",
        }
    }

    /// Birth always sorts first and death always last; other kinds share
    /// the middle bucket.
    fn rank(&self) -> u8 {
        match self {
            Self::Birth => 0,
            Self::Marriage => 1,
            Self::Death => 2,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "birth" => Ok(Self::Birth),
            "marriage" => Ok(Self::Marriage),
            "death" => Ok(Self::Death),
            other => Err(DomainError::parse(format!("Unknown event type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "eventID")]
    pub id: EventId,
    #[serde(rename = "associatedUsername")]
    pub username: Username,
    #[serde(rename = "personID")]
    pub person_id: PersonId,
    #[serde(flatten)]
    pub location: Location,
    pub event_type: EventType,
    pub year: i32,
}

impl Event {
    pub fn new(
        id: EventId,
        username: Username,
        person_id: PersonId,
        location: Location,
        event_type: EventType,
        year: i32,
    ) -> Self {
        Self {
            id,
            username,
            person_id,
            location,
            event_type,
            year,
        }
    }

    /// Presentation order within one person's life: birth first, death last,
    /// anything else by year and then by type name.
    pub fn chronological_cmp(&self, other: &Event) -> Ordering {
        self.event_type
            .rank()
            .cmp(&other.event_type.rank())
            .then_with(|| self.year.cmp(&other.year))
            .then_with(|| self.event_type.as_str().cmp(other.event_type.as_str()))
    }
}
