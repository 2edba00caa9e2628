//! Location models for feed cities and measuring stations

use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Coordinates as sent in the `geo` field, `[latitude, longitude]`
    #[must_use]
    pub fn from_geo(geo: [f64; 2]) -> Self {
        Self::new(geo[0], geo[1])
    }

    /// Format as a coordinates string
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A place known to the feed
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Page of this place on the feed's website
    pub external_url: String,
    pub name: String,
    pub coordinates: Coordinates,
}

impl Location {
    #[must_use]
    pub fn new(external_url: String, name: String, coordinates: Coordinates) -> Self {
        Self {
            external_url,
            name,
            coordinates,
        }
    }

    /// Two locations are the same place when URL and name match.
    #[must_use]
    pub fn same_place(&self, other: &Location) -> bool {
        self.external_url == other.external_url && self.name == other.name
    }
}

/// City a feed reading belongs to
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct City {
    #[serde(flatten)]
    pub location: Location,
    /// Finer locality label, absent when the feed sends an empty one
    pub locality: Option<String>,
}

impl City {
    #[must_use]
    pub fn new(location: Location, locality: Option<String>) -> Self {
        Self {
            location,
            locality: locality.filter(|label| !label.is_empty()),
        }
    }
}

/// Measuring station returned by a search
pub type Station = Location;

/// Data source credited by the feed
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Attribution {
    pub url: String,
    pub name: String,
    pub logo: Option<String>,
}

impl Attribution {
    #[must_use]
    pub fn new(url: String, name: &str, logo: Option<String>) -> Self {
        Self {
            url,
            name: name.trim().to_string(),
            logo,
        }
    }
}
