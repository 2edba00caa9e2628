//! Error types and handling for the WAQI client

use thiserror::Error;

use crate::breakpoints::Series;

/// Main error type for the WAQI client
#[derive(Error, Debug)]
pub enum WaqiError {
    /// Index passed to the converter is negative or infinite
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Index is numeric but no breakpoint segment of the series contains it
    #[error("Index {value} is out of range for {series}")]
    OutOfRange { series: Series, value: f64 },

    /// An ozone sub-index was asked for outside its valid band
    #[error("Index {value} is not covered by {series}, use {alternate} instead")]
    WrongSeries {
        series: Series,
        alternate: Series,
        value: f64,
    },

    /// A field required to build a record is absent or has the wrong shape
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    /// The feed does not know the requested city
    #[error("Could not find city {city}")]
    UnknownCity { city: String },

    /// The feed does not know the requested station
    #[error("Could not find station {station}")]
    UnknownStation { station: String },

    /// The feed rejected the API token
    #[error("Authentication failed: the feed rejected the API token")]
    Authentication,

    /// The feed answered with something that is not a JSON status envelope
    #[error("Unexpected response from the WAQI API (status {status}, content type '{content_type}')")]
    Protocol {
        status: u16,
        content_type: String,
        body: String,
    },

    /// Any other error reported by the feed
    #[error("API error: {message}")]
    Api { message: String },

    /// Transport failures and timeouts
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WaqiError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new malformed payload error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    /// Create a new generic API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new connection error
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error came from the feed itself rather than from the
    /// converter, the transport or local configuration.
    #[must_use]
    pub fn is_feed_error(&self) -> bool {
        matches!(
            self,
            WaqiError::UnknownCity { .. }
                | WaqiError::UnknownStation { .. }
                | WaqiError::Authentication
                | WaqiError::Protocol { .. }
                | WaqiError::Api { .. }
                | WaqiError::MalformedPayload { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WaqiError::InvalidInput { message } => format!("Invalid input: {message}"),
            WaqiError::OutOfRange { .. } | WaqiError::WrongSeries { .. } => self.to_string(),
            WaqiError::MalformedPayload { .. } | WaqiError::Protocol { .. } => {
                "The air quality service sent an unexpected response.".to_string()
            }
            WaqiError::UnknownCity { city } => format!("No air quality feed found for city '{city}'."),
            WaqiError::UnknownStation { station } => {
                format!("No air quality station found for '{station}'.")
            }
            WaqiError::Authentication => {
                "The API token was rejected. Please check the token in your config file.".to_string()
            }
            WaqiError::Api { message } => format!("The air quality service reported: {message}"),
            WaqiError::Connection { .. } => {
                "Unable to reach the air quality service. Please check your internet connection."
                    .to_string()
            }
            WaqiError::Config { .. } => {
                "Configuration error. Please check your config file and API token.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for WaqiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WaqiError::connection("Timeout occurred while connecting to the WAQI API")
        } else {
            WaqiError::connection(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = WaqiError::invalid_input("index must be a non-negative number");
        assert!(matches!(err, WaqiError::InvalidInput { .. }));

        let err = WaqiError::malformed("missing field `idx`");
        assert!(matches!(err, WaqiError::MalformedPayload { .. }));

        let err = WaqiError::config("bad level");
        assert!(matches!(err, WaqiError::Config { .. }));
    }

    #[test]
    fn test_wrong_series_names_alternate() {
        let err = WaqiError::WrongSeries {
            series: Series::Ozone8h,
            alternate: Series::Ozone1h,
            value: 301.0,
        };
        let message = err.to_string();
        assert!(message.contains("O3 (8h)"));
        assert!(message.contains("use O3 (1h)"));
    }

    #[test]
    fn test_user_messages() {
        let err = WaqiError::UnknownCity {
            city: "atlantis".to_string(),
        };
        assert!(err.user_message().contains("atlantis"));
        assert!(WaqiError::Authentication.user_message().contains("token"));
        assert!(WaqiError::connection("reset").user_message().contains("Unable to reach"));
    }

    #[test]
    fn test_feed_error_partition() {
        assert!(WaqiError::Authentication.is_feed_error());
        assert!(WaqiError::api("over quota").is_feed_error());
        assert!(!WaqiError::connection("reset").is_feed_error());
        assert!(!WaqiError::invalid_input("negative").is_feed_error());
    }
}
