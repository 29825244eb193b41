//! Creation of synthetic ancestors.

use std::sync::Arc;

use famtree_domain::{Gender, Person, PersonId, Username};

use crate::infrastructure::ports::{NameLocationPort, ProviderError, RandomPort};

#[derive(Clone)]
pub struct PersonFactory {
    names: Arc<dyn NameLocationPort>,
    random: Arc<dyn RandomPort>,
}

impl PersonFactory {
    pub fn new(names: Arc<dyn NameLocationPort>, random: Arc<dyn RandomPort>) -> Self {
        Self { names, random }
    }

    /// A fresh ancestor of `username` with a name drawn for `gender` and no
    /// lineage links.
    pub fn create_ancestor(
        &self,
        username: &Username,
        gender: Gender,
    ) -> Result<Person, ProviderError> {
        let name = self.names.random_name(gender)?;
        let id = PersonId::from_uuid(self.random.gen_uuid());
        Ok(Person::new(id, username.clone(), name, gender))
    }
}
