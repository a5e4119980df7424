//! Inbound request for one price benchmark: a dish name and a location.

use serde::{Deserialize, Serialize};

use crate::CoreError;

pub const DEFAULT_ITEM: &str = "Biryani";
pub const DEFAULT_LATITUDE: f64 = 28.654_20;
pub const DEFAULT_LONGITUDE: f64 = 77.237_30;

/// A validated scrape request.
///
/// Omitted or blank inputs fall back to the fixed defaults; they are never
/// treated as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishQuery {
    pub item: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for DishQuery {
    fn default() -> Self {
        Self {
            item: DEFAULT_ITEM.to_string(),
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
        }
    }
}

impl DishQuery {
    /// Builds a query from raw optional inputs, as they arrive from a query
    /// string or command line.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidQuery`] if a coordinate is present but not
    /// a finite number within its valid range.
    pub fn from_raw(
        item: Option<&str>,
        latitude: Option<&str>,
        longitude: Option<&str>,
    ) -> Result<Self, CoreError> {
        let item = non_blank(item).map_or_else(|| DEFAULT_ITEM.to_string(), str::to_owned);
        let latitude = match non_blank(latitude) {
            Some(raw) => parse_coordinate("lat", raw, 90.0)?,
            None => DEFAULT_LATITUDE,
        };
        let longitude = match non_blank(longitude) {
            Some(raw) => parse_coordinate("long", raw, 180.0)?,
            None => DEFAULT_LONGITUDE,
        };
        Ok(Self {
            item,
            latitude,
            longitude,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_coordinate(field: &'static str, raw: &str, bound: f64) -> Result<f64, CoreError> {
    let value = raw.parse::<f64>().map_err(|e| CoreError::InvalidQuery {
        field,
        reason: format!("\"{raw}\" is not a number: {e}"),
    })?;
    if !value.is_finite() || value.abs() > bound {
        return Err(CoreError::InvalidQuery {
            field,
            reason: format!("{value} is outside [-{bound}, {bound}]"),
        });
    }
    Ok(value)
}
