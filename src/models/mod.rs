//! Data models for the WAQI client
//!
//! - Location: cities, stations, coordinates and attributions
//! - Pollutant: species tags reported by the feed
//! - Air quality: feed snapshots and search results

pub mod air_quality;
pub mod location;
pub mod pollutant;

// Re-export all public types for convenient access
pub use air_quality::{AirQuality, ExtendedAirQuality, SearchResult};
pub use location::{Attribution, City, Coordinates, Location, Station};
pub use pollutant::{Pollutant, UnsupportedPollutant};
