//! Conversion of AQI sub-index values back into pollutant concentrations

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::breakpoints::Series;
use crate::error::WaqiError;

/// Concentration produced by [`convert`]
///
/// Series with a precision of zero produce whole numbers, all other series
/// keep their rounded decimal value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Concentration {
    Integer(i64),
    Decimal(f64),
}

impl Concentration {
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Concentration::Integer(value) => value as f64,
            Concentration::Decimal(value) => value,
        }
    }

    #[must_use]
    pub fn as_integer(self) -> Option<i64> {
        match self {
            Concentration::Integer(value) => Some(value),
            Concentration::Decimal(_) => None,
        }
    }
}

impl fmt::Display for Concentration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Concentration::Integer(value) => write!(f, "{value}"),
            Concentration::Decimal(value) => write!(f, "{value}"),
        }
    }
}

/// Linear interpolation from the index scale onto the concentration scale
#[must_use]
pub fn inverse_linear(
    index_high: f64,
    index_low: f64,
    conc_high: f64,
    conc_low: f64,
    index: f64,
) -> f64 {
    conc_low + (index - index_low) / (index_high - index_low) * (conc_high - conc_low)
}

/// Round to `precision` decimal places, ties to even
#[must_use]
pub fn round_half_even(value: f64, precision: u32) -> f64 {
    let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(3));
    (value * multiplier).round_ties_even() / multiplier
}

/// Convert an AQI sub-index value into a concentration for `series`.
///
/// Negative and infinite values are rejected as invalid input. The ozone
/// series only cover part of the AQI scale and report the series to use
/// instead. Values that no closed segment contains, NaN included, are out
/// of range.
pub fn convert(series: Series, index: f64) -> Result<Concentration> {
    if index < 0.0 || index.is_infinite() {
        return Err(WaqiError::invalid_input("index must be a non-negative number"));
    }

    let info = series.info();
    if let Some(alternate) = info.guard.and_then(|guard| guard.redirect(index)) {
        return Err(WaqiError::WrongSeries {
            series,
            alternate,
            value: index,
        });
    }

    let (index_low, index_high, conc_low, conc_high) = info
        .segments()
        .find(|&(low, high, _, _)| low <= index && index <= high)
        .ok_or(WaqiError::OutOfRange {
            series,
            value: index,
        })?;

    let raw = inverse_linear(index_high, index_low, conc_high, conc_low, index);
    let rounded = round_half_even(raw, info.precision);

    if info.precision == 0 {
        #[allow(clippy::cast_possible_truncation)]
        Ok(Concentration::Integer(rounded as i64))
    } else {
        Ok(Concentration::Decimal(rounded))
    }
}

/// Convert only when `index` is present and inside the series' band.
#[must_use]
pub fn convert_within_domain(series: Series, index: Option<f64>) -> Option<Concentration> {
    index
        .filter(|&value| series.covers(value))
        .and_then(|value| convert(series, value).ok())
}
