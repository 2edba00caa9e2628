//! Pollutant tags reported by the feed

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::breakpoints::Series;

/// Pollutant species known to the feed
///
/// `Unknown` stands for a tag this client does not recognise.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    #[serde(rename = "co")]
    CarbonMonoxide,
    #[serde(rename = "no2")]
    NitrogenDioxide,
    #[serde(rename = "o3")]
    Ozone,
    #[serde(rename = "so2")]
    SulfurDioxide,
    #[serde(rename = "pm10")]
    Pm10,
    #[serde(rename = "pm25")]
    Pm25,
    #[serde(rename = "neph")]
    Nephelometry,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Pollutant {
    /// Tag used by the feed
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Pollutant::CarbonMonoxide => "co",
            Pollutant::NitrogenDioxide => "no2",
            Pollutant::Ozone => "o3",
            Pollutant::SulfurDioxide => "so2",
            Pollutant::Pm10 => "pm10",
            Pollutant::Pm25 => "pm25",
            Pollutant::Nephelometry => "neph",
            Pollutant::Unknown => "unknown",
        }
    }

    /// Conversion series for this pollutant, if there is one
    #[must_use]
    pub fn series(self) -> Option<Series> {
        match self {
            Pollutant::CarbonMonoxide => Some(Series::CarbonMonoxide),
            Pollutant::NitrogenDioxide => Some(Series::NitrogenDioxide),
            Pollutant::Ozone => Some(Series::Ozone8h),
            Pollutant::Pm10 => Some(Series::Pm10),
            Pollutant::Pm25 => Some(Series::Pm25),
            Pollutant::SulfurDioxide | Pollutant::Nephelometry | Pollutant::Unknown => None,
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Tag that is not one of the known pollutants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedPollutant(pub String);

impl FromStr for Pollutant {
    type Err = UnsupportedPollutant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "co" => Ok(Pollutant::CarbonMonoxide),
            "no2" => Ok(Pollutant::NitrogenDioxide),
            "o3" => Ok(Pollutant::Ozone),
            "so2" => Ok(Pollutant::SulfurDioxide),
            "pm10" => Ok(Pollutant::Pm10),
            "pm25" => Ok(Pollutant::Pm25),
            "neph" => Ok(Pollutant::Nephelometry),
            other => Err(UnsupportedPollutant(other.to_string())),
        }
    }
}
