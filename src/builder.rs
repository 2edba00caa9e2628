//! Construction of air quality records from feed payloads
//!
//! The builder takes the `data` section of a response the classifier has
//! already accepted. Optional fields that are missing stay absent; missing
//! required fields become [`WaqiError::MalformedPayload`].

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::Result;
use crate::breakpoints::Series;
use crate::converters::convert_within_domain;
use crate::diagnostics::{DiagnosticReporter, Notice, TracingReporter};
use crate::error::WaqiError;
use crate::models::{
    AirQuality, Attribution, City, Coordinates, ExtendedAirQuality, Location, Pollutant,
    SearchResult, Station,
};

static DEFAULT_REPORTER: TracingReporter = TracingReporter;

/// Builds records, sending notices about unsupported values to a reporter
pub struct EntityBuilder<'r> {
    reporter: &'r dyn DiagnosticReporter,
}

impl Default for EntityBuilder<'static> {
    fn default() -> Self {
        Self {
            reporter: &DEFAULT_REPORTER,
        }
    }
}

impl<'r> EntityBuilder<'r> {
    #[must_use]
    pub fn new(reporter: &'r dyn DiagnosticReporter) -> Self {
        Self { reporter }
    }

    /// Build the snapshot of a feed from its `data` object
    pub fn build_air_quality(&self, data: &Value) -> Result<AirQuality> {
        let raw = feed::AirQuality::deserialize(data)
            .map_err(|e| WaqiError::malformed(format!("air quality: {e}")))?;

        let measured_at = raw
            .time
            .iso
            .as_deref()
            .map(|iso| {
                DateTime::parse_from_rfc3339(iso)
                    .map_err(|e| WaqiError::malformed(format!("invalid time.iso '{iso}': {e}")))
            })
            .transpose()?;

        let record = AirQuality {
            air_quality_index: parse_index(&raw.aqi),
            station_id: raw.idx,
            attributions: raw
                .attributions
                .into_iter()
                .map(|a| Attribution::new(a.url, &a.name, a.logo))
                .collect(),
            city: City::new(
                Location::new(raw.city.url, raw.city.name, Coordinates::from_geo(raw.city.geo)),
                raw.city.location,
            ),
            extended_air_quality: build_extended(&raw.iaqi),
            dominant_pollutant: raw
                .dominentpol
                .as_deref()
                .and_then(|tag| self.parse_dominant_pollutant(tag)),
            measured_at,
        };

        debug!(
            station_id = record.station_id,
            aqi = ?record.air_quality_index,
            "Built air quality record"
        );
        Ok(record)
    }

    /// Build one search hit
    pub fn build_search_result(&self, data: &Value) -> Result<SearchResult> {
        let raw = feed::SearchResult::deserialize(data)
            .map_err(|e| WaqiError::malformed(format!("search result: {e}")))?;

        Ok(SearchResult {
            air_quality_index: parse_index(&raw.aqi),
            station_id: raw.uid,
            station: Station::new(
                raw.station.url,
                raw.station.name,
                Coordinates::from_geo(raw.station.geo),
            ),
        })
    }

    /// Build every hit of a search response
    pub fn build_search_results(&self, data: &Value) -> Result<Vec<SearchResult>> {
        let hits = data
            .as_array()
            .ok_or_else(|| WaqiError::malformed("search data is not a list"))?;
        hits.iter().map(|hit| self.build_search_result(hit)).collect()
    }

    fn parse_dominant_pollutant(&self, tag: &str) -> Option<Pollutant> {
        if tag.is_empty() {
            return None;
        }
        match tag.parse::<Pollutant>() {
            Ok(pollutant) => Some(pollutant),
            Err(unsupported) => {
                self.reporter.report(Notice {
                    field: "dominentpol",
                    value: unsupported.0,
                });
                Some(Pollutant::Unknown)
            }
        }
    }
}

/// Build a snapshot, reporting unsupported values through `tracing`
pub fn build_air_quality(data: &Value) -> Result<AirQuality> {
    EntityBuilder::default().build_air_quality(data)
}

/// Build a search hit, reporting unsupported values through `tracing`
pub fn build_search_result(data: &Value) -> Result<SearchResult> {
    EntityBuilder::default().build_search_result(data)
}

/// Numeric coercion of the overall index; the feed sends "-" for no data.
#[allow(clippy::cast_possible_truncation)]
fn parse_index(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn build_extended(iaqi: &feed::Readings) -> ExtendedAirQuality {
    let reading = |code: &str| iaqi.get(code).and_then(|r| r.v.as_f64());

    let carbon_monoxide = reading("co");
    let nitrogen_dioxide = reading("no2");
    let ozone = reading("o3");
    let pm10 = reading("pm10");
    let pm25 = reading("pm25");

    ExtendedAirQuality {
        carbon_monoxide,
        carbon_monoxide_concentration: convert_within_domain(
            Series::CarbonMonoxide,
            carbon_monoxide,
        ),
        humidity: reading("h"),
        nephelometry: reading("neph"),
        nitrogen_dioxide,
        nitrogen_dioxide_concentration: convert_within_domain(
            Series::NitrogenDioxide,
            nitrogen_dioxide,
        ),
        ozone,
        ozone_concentration: convert_within_domain(Series::Ozone8h, ozone),
        pressure: reading("p"),
        sulfur_dioxide: reading("so2"),
        pm10,
        pm10_concentration: convert_within_domain(Series::Pm10, pm10),
        pm25,
        pm25_concentration: convert_within_domain(Series::Pm25, pm25),
        temperature: reading("t"),
    }
}

/// Wire shapes of the feed's `data` objects
mod feed {
    use std::collections::HashMap;

    use serde::Deserialize;
    use serde_json::Value;

    pub type Readings = HashMap<String, Reading>;

    #[derive(Debug, Deserialize)]
    pub struct AirQuality {
        #[serde(default)]
        pub aqi: Value,
        pub idx: i64,
        pub attributions: Vec<Attribution>,
        pub city: City,
        #[serde(default)]
        pub iaqi: Readings,
        #[serde(default)]
        pub dominentpol: Option<String>,
        pub time: Time,
    }

    #[derive(Debug, Deserialize)]
    pub struct Attribution {
        pub url: String,
        pub name: String,
        #[serde(default)]
        pub logo: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct City {
        pub url: String,
        pub name: String,
        pub geo: [f64; 2],
        #[serde(default)]
        pub location: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Reading {
        #[serde(default)]
        pub v: Value,
    }

    #[derive(Debug, Deserialize)]
    pub struct Time {
        #[serde(default)]
        pub iso: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct SearchResult {
        #[serde(default)]
        pub aqi: Value,
        pub uid: i64,
        pub station: Station,
    }

    #[derive(Debug, Deserialize)]
    pub struct Station {
        pub url: String,
        pub name: String,
        pub geo: [f64; 2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::Concentration;
    use crate::diagnostics::RecordingReporter;
    use serde_json::json;

    fn utrecht() -> Value {
        json!({
            "aqi": 29,
            "idx": 4586,
            "attributions": [
                {
                    "url": "https://www.luchtmeetnet.nl/",
                    "name": " RIVM - Rijksinstituut voor Volksgezondheid en Milieum ",
                    "logo": "Netherland-RIVM.png"
                },
                { "url": "https://waqi.info/", "name": "World Air Quality Index Project" }
            ],
            "city": {
                "geo": [52.105031, 5.124464],
                "name": "Utrecht",
                "url": "https://aqicn.org/city/netherland/utrecht",
                "location": ""
            },
            "dominentpol": "pm10",
            "iaqi": {
                "h": { "v": 93.1 },
                "no2": { "v": 2.8 },
                "o3": { "v": 17.4 },
                "p": { "v": 1011.2 },
                "pm10": { "v": 29 },
                "pm25": { "v": 13 },
                "t": { "v": 7.6 }
            },
            "time": {
                "s": "2023-08-07 17:00:00",
                "tz": "+02:00",
                "v": 1691427600,
                "iso": "2023-08-07T17:00:00+02:00"
            }
        })
    }

    #[test]
    fn test_build_air_quality() {
        let record = build_air_quality(&utrecht()).unwrap();

        assert_eq!(record.air_quality_index, Some(29));
        assert_eq!(record.station_id, 4586);
        assert_eq!(record.attributions.len(), 2);
        assert_eq!(
            record.attributions[0].name,
            "RIVM - Rijksinstituut voor Volksgezondheid en Milieum"
        );
        assert_eq!(record.attributions[1].logo, None);
        assert_eq!(record.city.location.name, "Utrecht");
        assert_eq!(record.city.locality, None);
        assert_eq!(record.city.location.coordinates.latitude, 52.105031);
        assert_eq!(record.dominant_pollutant, Some(Pollutant::Pm10));
        assert_eq!(
            record.measured_at.unwrap().to_rfc3339(),
            "2023-08-07T17:00:00+02:00"
        );
    }

    #[test]
    fn test_extended_readings_and_concentrations() {
        let extended = build_air_quality(&utrecht()).unwrap().extended_air_quality;

        assert_eq!(extended.humidity, Some(93.1));
        assert_eq!(extended.pressure, Some(1011.2));
        assert_eq!(extended.temperature, Some(7.6));
        assert_eq!(extended.pm10, Some(29.0));
        // 29 * 55 / 50 = 31.9
        assert_eq!(extended.pm10_concentration, Some(Concentration::Integer(32)));
        assert!(extended.pm25_concentration.is_some());
        assert!(extended.ozone_concentration.is_some());
        assert_eq!(extended.carbon_monoxide, None);
        assert_eq!(extended.carbon_monoxide_concentration, None);
        assert_eq!(extended.sulfur_dioxide, None);
        assert_eq!(extended.nephelometry, None);
    }

    #[test]
    fn test_concentration_absent_outside_domain() {
        let mut data = utrecht();
        data["iaqi"]["o3"] = json!({ "v": 320 });
        data["iaqi"]["pm25"] = json!({ "v": 999 });

        let extended = build_air_quality(&data).unwrap().extended_air_quality;
        assert_eq!(extended.ozone, Some(320.0));
        assert_eq!(extended.ozone_concentration, None);
        assert_eq!(extended.pm25, Some(999.0));
        assert_eq!(extended.pm25_concentration, None);
    }

    #[test]
    fn test_non_numeric_aqi_is_absent() {
        let mut data = utrecht();
        data["aqi"] = json!("-");
        let record = build_air_quality(&data).unwrap();
        assert_eq!(record.air_quality_index, None);

        data["aqi"] = json!("42");
        assert_eq!(build_air_quality(&data).unwrap().air_quality_index, Some(42));

        data["aqi"] = json!(61.8);
        assert_eq!(build_air_quality(&data).unwrap().air_quality_index, Some(61));
    }

    #[test]
    fn test_empty_dominant_pollutant_is_absent() {
        let mut data = utrecht();
        data["dominentpol"] = json!("");
        let reporter = RecordingReporter::new();
        let record = EntityBuilder::new(&reporter).build_air_quality(&data).unwrap();

        assert_eq!(record.dominant_pollutant, None);
        assert!(reporter.notices().is_empty());
    }

    #[test]
    fn test_null_dominant_pollutant_is_absent() {
        let mut data = utrecht();
        data["dominentpol"] = Value::Null;
        let reporter = RecordingReporter::new();
        let record = EntityBuilder::new(&reporter).build_air_quality(&data).unwrap();

        assert_eq!(record.dominant_pollutant, None);
        assert!(reporter.notices().is_empty());

        data.as_object_mut().unwrap().remove("dominentpol");
        assert_eq!(build_air_quality(&data).unwrap().dominant_pollutant, None);
    }

    #[test]
    fn test_unreadable_reading_is_absent() {
        let mut data = utrecht();
        data["iaqi"]["so2"] = json!({ "v": "-" });
        data["iaqi"]["pm10"] = json!({ "v": null });
        data["iaqi"]["co"] = json!({});

        let extended = build_air_quality(&data).unwrap().extended_air_quality;
        assert_eq!(extended.sulfur_dioxide, None);
        assert_eq!(extended.pm10, None);
        assert_eq!(extended.pm10_concentration, None);
        assert_eq!(extended.carbon_monoxide, None);
        assert_eq!(extended.pm25, Some(13.0));
        assert!(extended.pm25_concentration.is_some());
    }

    #[test]
    fn test_unknown_dominant_pollutant_is_reported_once() {
        let mut data = utrecht();
        data["dominentpol"] = json!("xyz");
        let reporter = RecordingReporter::new();
        let record = EntityBuilder::new(&reporter).build_air_quality(&data).unwrap();

        assert_eq!(record.dominant_pollutant, Some(Pollutant::Unknown));
        assert_eq!(
            reporter.notices(),
            vec![Notice {
                field: "dominentpol",
                value: "xyz".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_iso_leaves_timestamp_absent() {
        let mut data = utrecht();
        data["time"] = json!({ "s": "2023-08-07 17:00:00", "tz": "+02:00" });
        assert_eq!(build_air_quality(&data).unwrap().measured_at, None);
    }

    #[test]
    fn test_invalid_iso_is_malformed() {
        let mut data = utrecht();
        data["time"]["iso"] = json!("yesterday");
        assert!(matches!(
            build_air_quality(&data),
            Err(WaqiError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_missing_required_fields_are_malformed() {
        for field in ["idx", "city", "attributions", "time"] {
            let mut data = utrecht();
            data.as_object_mut().unwrap().remove(field);
            assert!(
                matches!(build_air_quality(&data), Err(WaqiError::MalformedPayload { .. })),
                "missing {field} should be malformed"
            );
        }

        let mut data = utrecht();
        data["city"].as_object_mut().unwrap().remove("geo");
        assert!(matches!(
            build_air_quality(&data),
            Err(WaqiError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_missing_optional_fields_do_not_raise() {
        let mut data = utrecht();
        let object = data.as_object_mut().unwrap();
        object.remove("iaqi");
        object.remove("dominentpol");
        object.remove("aqi");
        data["city"].as_object_mut().unwrap().remove("location");

        let record = build_air_quality(&data).unwrap();
        assert_eq!(record.air_quality_index, None);
        assert_eq!(record.dominant_pollutant, None);
        assert_eq!(record.extended_air_quality, ExtendedAirQuality::default());
    }

    #[test]
    fn test_build_search_results() {
        let data = json!([
            {
                "uid": 5771,
                "aqi": "24",
                "time": { "tz": "+02:00", "stime": "2023-08-07 17:00:00", "vtime": 1691420400 },
                "station": {
                    "name": "Utrecht-Griftpark, Utrecht",
                    "geo": [52.101308, 5.128183],
                    "url": "netherland/utrecht/griftpark",
                    "country": "NL"
                }
            },
            {
                "uid": 5772,
                "aqi": "-",
                "station": {
                    "name": "Utrecht-Kardinaal de Jongweg",
                    "geo": [52.105031, 5.124464],
                    "url": "netherland/utrecht/kardinaal-de-jongweg"
                }
            }
        ]);

        let results = EntityBuilder::default().build_search_results(&data).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].station_id, 5771);
        assert_eq!(results[0].air_quality_index, Some(24));
        assert_eq!(results[0].station.name, "Utrecht-Griftpark, Utrecht");
        assert_eq!(results[1].air_quality_index, None);
    }

    #[test]
    fn test_search_result_without_uid_is_malformed() {
        let data = json!({ "aqi": "1", "station": { "name": "x", "url": "y", "geo": [0.0, 0.0] } });
        assert!(matches!(
            build_search_result(&data),
            Err(WaqiError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index(&json!(42)), Some(42));
        assert_eq!(parse_index(&json!(42.9)), Some(42));
        assert_eq!(parse_index(&json!(" 17 ")), Some(17));
        assert_eq!(parse_index(&json!("-")), None);
        assert_eq!(parse_index(&Value::Null), None);
    }
}
