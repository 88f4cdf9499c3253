use crate::models::{CleanedRecord, ObservationRecord, StationRecord};

/// A station row paired with one of its observations.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub station: StationRecord,
    pub observation: ObservationRecord,
}

impl MergedRecord {
    pub fn new(station: StationRecord, observation: ObservationRecord) -> Self {
        Self {
            station,
            observation,
        }
    }

    pub fn climate_id(&self) -> &str {
        &self.observation.climate_id
    }
}

impl From<&CleanedRecord> for MergedRecord {
    fn from(record: &CleanedRecord) -> Self {
        let station = StationRecord::new(
            record.station_name.clone(),
            record.province.clone(),
            &record.climate_id,
            record.station_id,
            record.wmo_id.clone(),
            record.tc_id.clone(),
            record.latitude,
            record.longitude,
        );
        let observation = ObservationRecord::new(
            &record.climate_id,
            record.date.format("%Y-%m-%d").to_string(),
            record.year,
            record.month,
            Some(record.max_temp),
            Some(record.min_temp),
            record.mean_temp,
        );

        Self::new(station, observation)
    }
}
