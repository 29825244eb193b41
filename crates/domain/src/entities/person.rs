//! Person entity - One node of a user's family tree
//!
//! Lineage is stored as id links, never as references:
//! - `father_id` / `mother_id` point one generation further from the root
//! - `spouse_id` is symmetric between the two parents of a child

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::ids::PersonId;
use crate::value_objects::{PersonName, Username};

/// Biological role of a person in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" => Ok(Self::Male),
            "f" => Ok(Self::Female),
            other => Err(DomainError::parse(format!("Unknown gender: {}", other))),
        }
    }
}

/// A person owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(rename = "personID")]
    pub id: PersonId,
    #[serde(rename = "associatedUsername")]
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    #[serde(rename = "fatherID", skip_serializing_if = "Option::is_none")]
    pub father_id: Option<PersonId>,
    #[serde(rename = "motherID", skip_serializing_if = "Option::is_none")]
    pub mother_id: Option<PersonId>,
    #[serde(rename = "spouseID", skip_serializing_if = "Option::is_none")]
    pub spouse_id: Option<PersonId>,
}

impl Person {
    /// A person with no lineage links yet.
    pub fn new(id: PersonId, username: Username, name: PersonName, gender: Gender) -> Self {
        let (first_name, last_name) = name.into_parts();
        Self {
            id,
            username,
            first_name,
            last_name,
            gender,
            father_id: None,
            mother_id: None,
            spouse_id: None,
        }
    }

    pub fn set_parents(&mut self, father: &Person, mother: &Person) {
        self.father_id = Some(father.id);
        self.mother_id = Some(mother.id);
    }

    pub fn clear_parents(&mut self) {
        self.father_id = None;
        self.mother_id = None;
    }

    /// Link two persons as each other's spouse.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if the two share a gender or belong
    /// to different users.
    pub fn marry(a: &mut Person, b: &mut Person) -> Result<(), DomainError> {
        if a.gender == b.gender {
            return Err(DomainError::constraint(format!(
                "spouses {} and {} have the same gender",
                a.id, b.id
            )));
        }
        if a.username != b.username {
            return Err(DomainError::constraint(format!(
                "spouses {} and {} belong to different users",
                a.id, b.id
            )));
        }
        a.spouse_id = Some(b.id);
        b.spouse_id = Some(a.id);
        Ok(())
    }

    pub fn has_parents(&self) -> bool {
        self.father_id.is_some() && self.mother_id.is_some()
    }
}
