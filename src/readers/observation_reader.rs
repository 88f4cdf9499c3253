use crate::error::{ProcessingError, Result};
use crate::models::ObservationRecord;
use crate::utils::encoding::decode_csv_bytes;

const REQUIRED_COLUMNS: [&str; 7] = [
    "Climate ID",
    "Date/Time",
    "Year",
    "Month",
    "Max Temp (°C)",
    "Min Temp (°C)",
    "Mean Temp (°C)",
];

/// Parses one station-year body from the bulk daily data service.
///
/// Only the join key, date and temperature columns are read; everything else
/// in the response (flags, precipitation, snow, gusts) is ignored.
pub struct ObservationReader;

impl ObservationReader {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Vec<ObservationRecord>> {
        self.parse_observations(&decode_csv_bytes(bytes))
    }

    pub fn parse_observations(&self, text: &str) -> Result<Vec<ObservationRecord>> {
        if text.trim().is_empty() {
            return Err(ProcessingError::InvalidFormat(
                "Empty observation table".to_string(),
            ));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Observation table is missing columns: {}",
                missing.join(", ")
            )));
        }

        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: ObservationRecord = row?;
            records.push(record);
        }

        Ok(records)
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}
