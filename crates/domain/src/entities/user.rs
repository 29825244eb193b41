//! User entity - The owner of a root person

use serde::{Deserialize, Serialize};

use crate::ids::PersonId;
use crate::value_objects::Username;

/// A registered user as seeded by a bulk load.
///
/// Account details such as passwords belong to the registration service and
/// are not kept here. `auth_token`, when present, lets lookups resolve to
/// this user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: Username,
    #[serde(rename = "personID")]
    pub person_id: PersonId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}
