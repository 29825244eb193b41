//! Where an event happened.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A named place with coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub country: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(
        country: impl Into<String>,
        city: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::validation(format!(
                "Latitude out of range: {}",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::validation(format!(
                "Longitude out of range: {}",
                longitude
            )));
        }
        Ok(Self {
            country: country.into(),
            city: city.into(),
            latitude,
            longitude,
        })
    }
}
