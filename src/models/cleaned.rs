use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};
use crate::models::MergedRecord;

/// Column order of the persisted CSV and of every workbook sheet.
pub const CLEANED_COLUMNS: [&str; 14] = [
    "Station Name",
    "Province",
    "Station ID",
    "Climate ID",
    "Longitude (x)",
    "Latitude (y)",
    "Date/Time",
    "Year",
    "Month",
    "WMO ID",
    "TC ID",
    "Max Temp (°C)",
    "Min Temp (°C)",
    "Mean Temp (°C)",
];

/// Unit of persistence: a merged row that passed both filters, projected to the output schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    #[serde(rename = "Station Name")]
    pub station_name: String,

    #[serde(rename = "Province")]
    pub province: String,

    #[serde(rename = "Station ID")]
    pub station_id: u32,

    #[serde(rename = "Climate ID")]
    pub climate_id: String,

    #[serde(rename = "Longitude (x)")]
    pub longitude: f64,

    #[serde(rename = "Latitude (y)")]
    pub latitude: f64,

    #[serde(rename = "Date/Time")]
    pub date: NaiveDate,

    #[serde(rename = "Year")]
    pub year: i32,

    #[serde(rename = "Month")]
    pub month: u32,

    #[serde(rename = "WMO ID")]
    pub wmo_id: Option<String>,

    #[serde(rename = "TC ID")]
    pub tc_id: Option<String>,

    #[serde(rename = "Max Temp (°C)")]
    pub max_temp: f64,

    #[serde(rename = "Min Temp (°C)")]
    pub min_temp: f64,

    #[serde(rename = "Mean Temp (°C)")]
    pub mean_temp: Option<f64>,
}

impl CleanedRecord {
    /// Project a merged row whose date has already been parsed and filtered.
    ///
    /// Fails when either extreme is missing; the cleaner drops those rows first.
    pub fn project(merged: MergedRecord, date: NaiveDate) -> Result<Self> {
        let MergedRecord {
            station,
            observation,
        } = merged;

        let (max_temp, min_temp) = match (observation.max_temp, observation.min_temp) {
            (Some(max), Some(min)) => (max, min),
            _ => {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Row for {} on {} is missing max or min temperature",
                    station.name, observation.date_time
                )))
            }
        };

        Ok(Self {
            station_name: station.name,
            province: station.province,
            station_id: station.station_id,
            climate_id: observation.climate_id,
            longitude: station.longitude,
            latitude: station.latitude,
            date,
            year: observation.year,
            month: observation.month,
            wmo_id: station.wmo_id,
            tc_id: station.tc_id,
            max_temp,
            min_temp,
            mean_temp: observation.mean_temp,
        })
    }

    pub fn temperature_range(&self) -> f64 {
        self.max_temp - self.min_temp
    }
}
