//! AQI breakpoint reference data
//!
//! Each series maps the AQI scale onto a concentration scale through an
//! ordered list of breakpoints. Consecutive breakpoints form one
//! interpolation segment, so the upper end of one segment is the lower end
//! of the next. An index boundary of `None` opens the segment on that side;
//! such segments are never used for lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WaqiError;

/// One (index, concentration) pair of a series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    /// AQI boundary, `None` for an open end
    pub index: Option<f64>,
    /// Concentration boundary in the series' unit
    pub concentration: f64,
}

const fn bp(index: f64, concentration: f64) -> Breakpoint {
    Breakpoint {
        index: Some(index),
        concentration,
    }
}

const fn open(concentration: f64) -> Breakpoint {
    Breakpoint {
        index: None,
        concentration,
    }
}

/// Restriction of a series to part of the AQI scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesGuard {
    /// Index values above `index` belong to `alternate`
    Ceiling { index: f64, alternate: Series },
    /// Index values at or below `index` belong to `alternate`
    Floor { index: f64, alternate: Series },
}

impl SeriesGuard {
    /// The alternate series when `value` falls outside the guarded band
    #[must_use]
    pub fn redirect(&self, value: f64) -> Option<Series> {
        match *self {
            SeriesGuard::Ceiling { index, alternate } if value > index => Some(alternate),
            SeriesGuard::Floor { index, alternate } if value <= index => Some(alternate),
            _ => None,
        }
    }
}

/// Static description of one conversion series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollutantInfo {
    /// Display unit of the concentration
    pub unit: &'static str,
    /// Display name
    pub name: &'static str,
    /// Decimal places kept after conversion, 0 means integer output
    pub precision: u32,
    pub breakpoints: &'static [Breakpoint],
    pub guard: Option<SeriesGuard>,
}

impl PollutantInfo {
    /// Closed interpolation segments, skipping any with an open end
    pub fn segments(&self) -> impl Iterator<Item = (f64, f64, f64, f64)> + '_ {
        self.breakpoints.windows(2).filter_map(|pair| {
            let (low, high) = (pair[0], pair[1]);
            Some((
                low.index?,
                high.index?,
                low.concentration,
                high.concentration,
            ))
        })
    }

    /// Lowest and highest bounded index of the series
    #[must_use]
    pub fn index_bounds(&self) -> Option<(f64, f64)> {
        let mut bounded = self.breakpoints.iter().filter_map(|b| b.index);
        let first = bounded.next()?;
        let last = bounded.last().unwrap_or(first);
        Some((first, last))
    }
}

const PM25_BREAKPOINTS: [Breakpoint; 8] = [
    bp(0.0, 0.0),
    bp(50.0, 12.1),
    bp(100.0, 35.5),
    bp(150.0, 55.5),
    bp(200.0, 150.5),
    bp(300.0, 250.5),
    bp(400.0, 350.5),
    bp(500.0, 500.5),
];

const PM10_BREAKPOINTS: [Breakpoint; 8] = [
    bp(0.0, 0.0),
    bp(50.0, 55.0),
    bp(100.0, 155.0),
    bp(150.0, 255.0),
    bp(200.0, 355.0),
    bp(300.0, 425.0),
    bp(400.0, 505.0),
    bp(500.0, 605.0),
];

const CO_BREAKPOINTS: [Breakpoint; 8] = [
    bp(0.0, 0.0),
    bp(50.0, 4.5),
    bp(100.0, 9.5),
    bp(150.0, 12.5),
    bp(200.0, 15.5),
    bp(300.0, 30.5),
    bp(400.0, 40.5),
    bp(500.0, 50.5),
];

const NO2_BREAKPOINTS: [Breakpoint; 8] = [
    bp(0.0, 0.0),
    bp(50.0, 54.0),
    bp(100.0, 101.0),
    bp(150.0, 361.0),
    bp(200.0, 650.0),
    bp(300.0, 1250.0),
    bp(400.0, 1650.0),
    bp(500.0, 2050.0),
];

// 8-hour ozone is undefined above 300.
const O3_8H_BREAKPOINTS: [Breakpoint; 7] = [
    bp(0.0, 0.0),
    bp(50.0, 0.055),
    bp(100.0, 0.071),
    bp(150.0, 0.086),
    bp(200.0, 0.106),
    bp(300.0, 0.201),
    open(0.201),
];

// 1-hour ozone is undefined at or below 100.
const O3_1H_BREAKPOINTS: [Breakpoint; 7] = [
    open(0.0),
    bp(100.0, 0.125),
    bp(150.0, 0.165),
    bp(200.0, 0.205),
    bp(300.0, 0.405),
    bp(400.0, 0.505),
    bp(500.0, 0.605),
];

const PM25: PollutantInfo = PollutantInfo {
    unit: "µg/m³",
    name: "PM2.5",
    precision: 1,
    breakpoints: &PM25_BREAKPOINTS,
    guard: None,
};

const PM10: PollutantInfo = PollutantInfo {
    unit: "µg/m³",
    name: "PM10",
    precision: 0,
    breakpoints: &PM10_BREAKPOINTS,
    guard: None,
};

const CO: PollutantInfo = PollutantInfo {
    unit: "ppm",
    name: "CO",
    precision: 1,
    breakpoints: &CO_BREAKPOINTS,
    guard: None,
};

const NO2: PollutantInfo = PollutantInfo {
    unit: "ppb",
    name: "NO2",
    precision: 0,
    breakpoints: &NO2_BREAKPOINTS,
    guard: None,
};

const O3_8H: PollutantInfo = PollutantInfo {
    unit: "ppm",
    name: "O3 (8h)",
    precision: 3,
    breakpoints: &O3_8H_BREAKPOINTS,
    guard: Some(SeriesGuard::Ceiling {
        index: 300.0,
        alternate: Series::Ozone1h,
    }),
};

const O3_1H: PollutantInfo = PollutantInfo {
    unit: "ppm",
    name: "O3 (1h)",
    precision: 3,
    breakpoints: &O3_1H_BREAKPOINTS,
    guard: Some(SeriesGuard::Floor {
        index: 100.0,
        alternate: Series::Ozone8h,
    }),
};

/// Conversion series with a breakpoint table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    Pm25,
    Pm10,
    CarbonMonoxide,
    NitrogenDioxide,
    Ozone8h,
    Ozone1h,
}

impl Series {
    pub const ALL: [Series; 6] = [
        Series::Pm25,
        Series::Pm10,
        Series::CarbonMonoxide,
        Series::NitrogenDioxide,
        Series::Ozone8h,
        Series::Ozone1h,
    ];

    /// Reference data for this series
    #[must_use]
    pub fn info(self) -> &'static PollutantInfo {
        match self {
            Series::Pm25 => &PM25,
            Series::Pm10 => &PM10,
            Series::CarbonMonoxide => &CO,
            Series::NitrogenDioxide => &NO2,
            Series::Ozone8h => &O3_8H,
            Series::Ozone1h => &O3_1H,
        }
    }

    #[must_use]
    pub fn unit(self) -> &'static str {
        self.info().unit
    }

    /// Whether `value` lies inside the band this series can convert.
    #[must_use]
    pub fn covers(self, value: f64) -> bool {
        let info = self.info();
        if !value.is_finite() || value < 0.0 {
            return false;
        }
        if info.guard.is_some_and(|guard| guard.redirect(value).is_some()) {
            return false;
        }
        info.index_bounds()
            .is_some_and(|(low, high)| low <= value && value <= high)
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().name)
    }
}

impl FromStr for Series {
    type Err = WaqiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pm25" | "pm2.5" => Ok(Series::Pm25),
            "pm10" => Ok(Series::Pm10),
            "co" => Ok(Series::CarbonMonoxide),
            "no2" => Ok(Series::NitrogenDioxide),
            "o3" | "o3_8h" | "o3-8h" => Ok(Series::Ozone8h),
            "o3_1h" | "o3-1h" => Ok(Series::Ozone1h),
            other => Err(WaqiError::invalid_input(format!(
                "unknown series '{other}', expected one of pm25, pm10, co, no2, o3_8h, o3_1h"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_monotonic() {
        for series in Series::ALL {
            let info = series.info();
            let indices: Vec<f64> = info.breakpoints.iter().filter_map(|b| b.index).collect();
            assert!(
                indices.windows(2).all(|w| w[0] <= w[1]),
                "{series} index boundaries not sorted"
            );
            assert!(
                info.breakpoints
                    .windows(2)
                    .all(|w| w[0].concentration <= w[1].concentration),
                "{series} concentration boundaries not sorted"
            );
        }
    }

    #[test]
    fn test_open_segments_are_skipped() {
        assert_eq!(Series::Ozone8h.info().segments().count(), 5);
        assert_eq!(Series::Ozone1h.info().segments().count(), 5);
        assert_eq!(Series::Pm25.info().segments().count(), 7);
    }

    #[test]
    fn test_index_bounds() {
        assert_eq!(Series::Ozone8h.info().index_bounds(), Some((0.0, 300.0)));
        assert_eq!(Series::Ozone1h.info().index_bounds(), Some((100.0, 500.0)));
    }

    #[test]
    fn test_covers() {
        assert!(Series::Pm25.covers(0.0));
        assert!(Series::Pm25.covers(500.0));
        assert!(!Series::Pm25.covers(500.5));
        assert!(!Series::Pm25.covers(-1.0));
        assert!(!Series::Pm25.covers(f64::NAN));
        assert!(Series::Ozone8h.covers(300.0));
        assert!(!Series::Ozone8h.covers(301.0));
        assert!(!Series::Ozone1h.covers(100.0));
        assert!(Series::Ozone1h.covers(101.0));
    }

    #[test]
    fn test_series_from_str() {
        assert_eq!("PM2.5".parse::<Series>().unwrap(), Series::Pm25);
        assert_eq!("o3".parse::<Series>().unwrap(), Series::Ozone8h);
        assert_eq!("o3_1h".parse::<Series>().unwrap(), Series::Ozone1h);
        assert!("so2".parse::<Series>().is_err());
    }
}
