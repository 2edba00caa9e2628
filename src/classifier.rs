//! Classification of feed responses
//!
//! Every response ends in exactly one outcome: the `data` section of a
//! successful payload, a domain error decoded from the feed's error shapes,
//! or a protocol error when the body is not a JSON status envelope.

use std::fmt;

use serde_json::Value;

use crate::Result;
use crate::error::WaqiError;
use crate::transport::FeedResponse;

/// The request a response answers, needed to tell failures apart
#[derive(Debug, Clone, PartialEq)]
pub enum FeedQuery {
    /// Feed of a city by name
    City(String),
    /// Feed of a station by name, `@<number>` or `here`
    Station(String),
    /// Feed of the station nearest to a position
    Coordinates { latitude: f64, longitude: f64 },
    /// Keyword search over stations
    Search(String),
}

impl fmt::Display for FeedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedQuery::City(city) => write!(f, "city '{city}'"),
            FeedQuery::Station(station) => write!(f, "station '{station}'"),
            FeedQuery::Coordinates {
                latitude,
                longitude,
            } => write!(f, "position {latitude:.4}, {longitude:.4}"),
            FeedQuery::Search(keyword) => write!(f, "search '{keyword}'"),
        }
    }
}

const INVALID_KEY: &str = "Invalid key";
const UNKNOWN_STATION: &str = "Unknown station";
const NO_SUCH_STATION: &str = "no such station";
const UNKNOWN_ID: &str = "Unknown ID";

/// Whether a content type names a JSON media type
#[must_use]
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Classify a received response and return its `data` section on success.
pub fn classify(query: &FeedQuery, response: &FeedResponse) -> Result<Value> {
    if !is_json_content_type(&response.content_type) {
        return Err(protocol_error(response));
    }

    let payload: Value =
        serde_json::from_str(&response.body).map_err(|_| protocol_error(response))?;

    match payload.get("status").and_then(Value::as_str) {
        Some("ok") => {
            let data = payload.get("data").cloned().unwrap_or(Value::Null);
            // the feed-by-id endpoint nests its failures inside an "ok" envelope
            if is_nested_error(&data) {
                Err(disambiguate(query, &data))
            } else {
                Ok(data)
            }
        }
        Some("error") => Err(disambiguate(
            query,
            payload.get("data").unwrap_or(&Value::Null),
        )),
        _ => Err(protocol_error(response)),
    }
}

fn is_nested_error(data: &Value) -> bool {
    data.get("status").and_then(Value::as_str) == Some("error")
}

fn protocol_error(response: &FeedResponse) -> WaqiError {
    WaqiError::Protocol {
        status: response.status,
        content_type: response.content_type.clone(),
        body: response.body.clone(),
    }
}

fn disambiguate(query: &FeedQuery, data: &Value) -> WaqiError {
    match data {
        Value::String(message) => match (message.as_str(), query) {
            (INVALID_KEY, _) => WaqiError::Authentication,
            (UNKNOWN_STATION, FeedQuery::City(city)) => WaqiError::UnknownCity { city: city.clone() },
            (UNKNOWN_STATION | NO_SUCH_STATION, FeedQuery::Station(station)) => {
                WaqiError::UnknownStation {
                    station: station.clone(),
                }
            }
            _ => WaqiError::api(message.clone()),
        },
        Value::Object(fields) => {
            let message = fields.get("msg").and_then(Value::as_str);
            match (message, query) {
                (Some(UNKNOWN_ID), FeedQuery::Station(station) | FeedQuery::City(station))
                    if is_nested_error(data) =>
                {
                    WaqiError::UnknownStation {
                        station: station.clone(),
                    }
                }
                (Some(INVALID_KEY), _) => WaqiError::Authentication,
                (Some(message), _) => WaqiError::api(message),
                (None, _) => WaqiError::api(data.to_string()),
            }
        }
        Value::Null => WaqiError::api(format!("unspecified error for {query}")),
        other => WaqiError::api(other.to_string()),
    }
}
