//! Axis coordinate transforms.

use crate::ir::Datum;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    #[default]
    Linear,
    Log,
    Date,
    Category,
}

impl FromStr for AxisType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" | "-" => Ok(AxisType::Linear),
            "log" => Ok(AxisType::Log),
            "date" => Ok(AxisType::Date),
            "category" => Ok(AxisType::Category),
            other => Err(format!("unknown axis type '{}'", other)),
        }
    }
}

/// What the parameter builder needs from an axis.
pub trait CoordinateAxis {
    fn axis_type(&self) -> AxisType;

    /// Data value to linear coordinate. Unconvertible data maps to NaN.
    fn data_to_coord(&self, datum: &Datum) -> f64;

    /// Linear coordinate to log space; only applied on log axes.
    fn coord_to_log(&self, coord: f64) -> f64;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Axis {
    #[serde(rename = "type", default)]
    pub axis_type: AxisType,
    /// Category names in display order, for category axes.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Axis {
    pub fn new(axis_type: AxisType) -> Self {
        Self { axis_type, categories: Vec::new() }
    }

    pub fn with_categories(categories: Vec<String>) -> Self {
        Self { axis_type: AxisType::Category, categories }
    }
}

impl CoordinateAxis for Axis {
    fn axis_type(&self) -> AxisType {
        self.axis_type
    }

    fn data_to_coord(&self, datum: &Datum) -> f64 {
        match self.axis_type {
            AxisType::Linear | AxisType::Log => datum.as_number().unwrap_or(f64::NAN),
            AxisType::Date => match datum {
                Datum::Number(n) => *n,
                Datum::Text(s) => parse_date_ms(s).unwrap_or(f64::NAN),
                Datum::Missing => f64::NAN,
            },
            AxisType::Category => {
                let key = datum.to_string();
                self.categories
                    .iter()
                    .position(|c| *c == key)
                    .map(|i| i as f64)
                    .unwrap_or(f64::NAN)
            }
        }
    }

    fn coord_to_log(&self, coord: f64) -> f64 {
        if coord > 0.0 {
            coord.log10()
        } else {
            f64::NAN
        }
    }
}

/// Milliseconds since the Unix epoch for `YYYY-MM-DD[ HH:MM[:SS[.f]]]`.
fn parse_date_ms(s: &str) -> Option<f64> {
    let s = s.trim();
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis() as f64);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis() as f64)
}
