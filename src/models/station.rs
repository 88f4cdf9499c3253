use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::identifiers::{deserialize_climate_id, normalize_climate_id};

/// One row of the station inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationRecord {
    #[serde(rename = "Name")]
    #[validate(length(min = 1))]
    pub name: String,

    #[serde(rename = "Province")]
    pub province: String,

    #[serde(rename = "Climate ID", deserialize_with = "deserialize_climate_id")]
    pub climate_id: String,

    #[serde(rename = "Station ID")]
    pub station_id: u32,

    #[serde(rename = "WMO ID")]
    pub wmo_id: Option<String>,

    #[serde(rename = "TC ID")]
    pub tc_id: Option<String>,

    #[serde(rename = "Latitude (y)", alias = "Latitude (Decimal Degrees)")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[serde(rename = "Longitude (x)", alias = "Longitude (Decimal Degrees)")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl StationRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        province: String,
        climate_id: &str,
        station_id: u32,
        wmo_id: Option<String>,
        tc_id: Option<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            name,
            province,
            climate_id: normalize_climate_id(climate_id),
            station_id,
            wmo_id,
            tc_id,
            latitude,
            longitude,
        }
    }

    pub fn matches_name(&self, city_upper: &str) -> bool {
        self.name == city_upper
    }
}
