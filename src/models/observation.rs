use serde::{Deserialize, Serialize};

use crate::utils::identifiers::{deserialize_climate_id, normalize_climate_id};

/// One station-day from the bulk daily data service.
///
/// Temperatures are `None` where the station did not report; a gap is never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    #[serde(rename = "Climate ID", deserialize_with = "deserialize_climate_id")]
    pub climate_id: String,

    #[serde(rename = "Date/Time")]
    pub date_time: String,

    #[serde(rename = "Year")]
    pub year: i32,

    #[serde(rename = "Month")]
    pub month: u32,

    #[serde(rename = "Max Temp (°C)")]
    pub max_temp: Option<f64>,

    #[serde(rename = "Min Temp (°C)")]
    pub min_temp: Option<f64>,

    #[serde(rename = "Mean Temp (°C)")]
    pub mean_temp: Option<f64>,
}

impl ObservationRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        climate_id: &str,
        date_time: String,
        year: i32,
        month: u32,
        max_temp: Option<f64>,
        min_temp: Option<f64>,
        mean_temp: Option<f64>,
    ) -> Self {
        Self {
            climate_id: normalize_climate_id(climate_id),
            date_time,
            year,
            month,
            max_temp,
            min_temp,
            mean_temp,
        }
    }

    pub fn has_extremes(&self) -> bool {
        self.max_temp.is_some() && self.min_temp.is_some()
    }
}
