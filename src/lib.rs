//! `waqi` - Client for the World Air Quality Index feed
//!
//! This library fetches air quality readings, classifies feed responses
//! into records or typed errors, and converts AQI sub-index values back
//! into pollutant concentrations.

pub mod breakpoints;
pub mod builder;
pub mod classifier;
pub mod client;
pub mod config;
pub mod converters;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod models;
pub mod transport;

// Re-export core types for public API
pub use breakpoints::{PollutantInfo, Series};
pub use builder::{EntityBuilder, build_air_quality, build_search_result};
pub use classifier::{FeedQuery, classify};
pub use client::WaqiClient;
pub use config::WaqiConfig;
pub use converters::{Concentration, convert};
pub use diagnostics::{DiagnosticReporter, Notice, RecordingReporter, TracingReporter};
pub use error::WaqiError;
pub use models::{
    AirQuality, Attribution, City, Coordinates, ExtendedAirQuality, Location, Pollutant,
    SearchResult, Station,
};
pub use transport::{FeedResponse, FeedTransport, HttpTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WaqiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
