//! JSON-backed name and location data.
//!
//! The dataset is a single `names.json` with male and female first names,
//! surnames, and locations. A copy ships inside the binary; a directory
//! holding another `names.json` can replace it.

use std::path::Path;
use std::sync::Arc;

use famtree_domain::{Gender, Location, PersonName};
use serde::Deserialize;
use tokio::fs;

use crate::infrastructure::ports::{NameLocationPort, ProviderError, RandomPort};

const EMBEDDED_NAMES: &str = include_str!("../../data/names.json");
const DATA_FILE: &str = "names.json";

#[derive(Debug, Deserialize)]
struct NameData {
    male: Vec<String>,
    female: Vec<String>,
    surnames: Vec<String>,
    locations: Vec<LocationEntry>,
}

#[derive(Debug, Deserialize)]
struct LocationEntry {
    country: String,
    city: String,
    latitude: f64,
    longitude: f64,
}

pub struct JsonNameLocationProvider {
    male: Vec<String>,
    female: Vec<String>,
    surnames: Vec<String>,
    locations: Vec<Location>,
    random: Arc<dyn RandomPort>,
}

impl JsonNameLocationProvider {
    /// Provider over the dataset compiled into the binary.
    pub fn embedded(random: Arc<dyn RandomPort>) -> Result<Self, ProviderError> {
        Self::from_json(EMBEDDED_NAMES, random)
    }

    /// Provider over `<dir>/names.json`.
    pub async fn from_dir(dir: &Path, random: Arc<dyn RandomPort>) -> Result<Self, ProviderError> {
        let path = dir.join(DATA_FILE);
        let json = fs::read_to_string(&path).await.map_err(|e| {
            ProviderError::Unavailable(format!("{}: {}", path.display(), e))
        })?;
        let provider = Self::from_json(&json, random)?;
        tracing::info!(
            path = %path.display(),
            locations = provider.locations.len(),
            "Loaded name/location dataset"
        );
        Ok(provider)
    }

    pub fn from_json(json: &str, random: Arc<dyn RandomPort>) -> Result<Self, ProviderError> {
        let data: NameData = serde_json::from_str(json)
            .map_err(|e| ProviderError::Unavailable(format!("malformed dataset: {}", e)))?;

        let locations = data
            .locations
            .into_iter()
            .map(|entry| {
                Location::new(entry.country, entry.city, entry.latitude, entry.longitude)
                    .map_err(|e| ProviderError::InvalidEntry(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            male: data.male,
            female: data.female,
            surnames: data.surnames,
            locations,
            random,
        })
    }

    fn pick<'a, T>(&self, items: &'a [T], what: &'static str) -> Result<&'a T, ProviderError> {
        if items.is_empty() {
            return Err(ProviderError::Empty(what));
        }
        let last = i32::try_from(items.len() - 1).unwrap_or(i32::MAX);
        let index = self.random.gen_range(0, last);
        usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .ok_or_else(|| ProviderError::InvalidEntry(format!("{} index {}", what, index)))
    }
}

impl NameLocationPort for JsonNameLocationProvider {
    fn random_name(&self, gender: Gender) -> Result<PersonName, ProviderError> {
        let first = match gender {
            Gender::Male => self.pick(&self.male, "male name")?,
            Gender::Female => self.pick(&self.female, "female name")?,
        };
        let last = self.pick(&self.surnames, "surname")?;
        PersonName::new(first.as_str(), last.as_str())
            .map_err(|e| ProviderError::InvalidEntry(e.to_string()))
    }

    fn random_location(&self) -> Result<Location, ProviderError> {
        self.pick(&self.locations, "location").cloned()
    }
}
