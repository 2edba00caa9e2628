//! Air quality records built from feed responses

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::location::{Attribution, City, Station};
use super::pollutant::Pollutant;
use crate::converters::Concentration;

/// Individual readings of a feed, raw index values plus derived
/// concentrations where a conversion series exists
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ExtendedAirQuality {
    pub carbon_monoxide: Option<f64>,
    pub carbon_monoxide_concentration: Option<Concentration>,
    /// Relative humidity in percent
    pub humidity: Option<f64>,
    pub nephelometry: Option<f64>,
    pub nitrogen_dioxide: Option<f64>,
    pub nitrogen_dioxide_concentration: Option<Concentration>,
    pub ozone: Option<f64>,
    /// Derived from the 8-hour ozone series
    pub ozone_concentration: Option<Concentration>,
    /// Atmospheric pressure in hPa
    pub pressure: Option<f64>,
    pub sulfur_dioxide: Option<f64>,
    pub pm10: Option<f64>,
    pub pm10_concentration: Option<Concentration>,
    pub pm25: Option<f64>,
    pub pm25_concentration: Option<Concentration>,
    /// Temperature in Celsius
    pub temperature: Option<f64>,
}

impl ExtendedAirQuality {
    /// Raw index reading for a pollutant
    #[must_use]
    pub fn index(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::CarbonMonoxide => self.carbon_monoxide,
            Pollutant::NitrogenDioxide => self.nitrogen_dioxide,
            Pollutant::Ozone => self.ozone,
            Pollutant::SulfurDioxide => self.sulfur_dioxide,
            Pollutant::Pm10 => self.pm10,
            Pollutant::Pm25 => self.pm25,
            Pollutant::Nephelometry => self.nephelometry,
            Pollutant::Unknown => None,
        }
    }

    /// Derived concentration for a pollutant
    #[must_use]
    pub fn concentration(&self, pollutant: Pollutant) -> Option<Concentration> {
        match pollutant {
            Pollutant::CarbonMonoxide => self.carbon_monoxide_concentration,
            Pollutant::NitrogenDioxide => self.nitrogen_dioxide_concentration,
            Pollutant::Ozone => self.ozone_concentration,
            Pollutant::Pm10 => self.pm10_concentration,
            Pollutant::Pm25 => self.pm25_concentration,
            Pollutant::SulfurDioxide | Pollutant::Nephelometry | Pollutant::Unknown => None,
        }
    }
}

/// Air quality snapshot of one feed
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AirQuality {
    /// Overall AQI, absent when the feed has no data
    pub air_quality_index: Option<i64>,
    pub station_id: i64,
    pub attributions: Vec<Attribution>,
    pub city: City,
    pub extended_air_quality: ExtendedAirQuality,
    pub dominant_pollutant: Option<Pollutant>,
    pub measured_at: Option<DateTime<FixedOffset>>,
}

/// Station found by a keyword search
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SearchResult {
    pub air_quality_index: Option<i64>,
    pub station_id: i64,
    pub station: Station,
}
