use crate::models::{MergedRecord, ObservationRecord, StationRecord};
use crate::utils::identifiers::normalize_climate_id;
use std::collections::HashMap;
use serde::Serialize;
use tracing::info;

/// Row counts around a join. Unmatched rows are dropped either way; these only report them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub stations_in: usize,
    pub observations_in: usize,
    pub unmatched_observations: usize,
    pub merged_rows: usize,
}

pub struct RecordJoiner;

impl RecordJoiner {
    pub fn new() -> Self {
        Self
    }

    /// Inner join on string-normalized climate id.
    ///
    /// Output follows observation order; when several stations share an id,
    /// each observation yields one row per station in inventory order.
    pub fn join(
        &self,
        stations: &[StationRecord],
        observations: &[ObservationRecord],
    ) -> (Vec<MergedRecord>, JoinReport) {
        let stations_by_id = self.group_by_climate_id(stations);

        let mut merged = Vec::new();
        let mut unmatched = 0;

        for observation in observations {
            let key = normalize_climate_id(&observation.climate_id);

            match stations_by_id.get(key.as_str()) {
                Some(matches) => {
                    for station in matches {
                        let mut station = (*station).clone();
                        station.climate_id = key.clone();
                        let mut observation = observation.clone();
                        observation.climate_id = key.clone();
                        merged.push(MergedRecord::new(station, observation));
                    }
                }
                None => unmatched += 1,
            }
        }

        let report = JoinReport {
            stations_in: stations.len(),
            observations_in: observations.len(),
            unmatched_observations: unmatched,
            merged_rows: merged.len(),
        };

        info!(
            "Join complete: {} observations x {} stations -> {} rows ({} observations unmatched)",
            report.observations_in, report.stations_in, report.merged_rows, report.unmatched_observations
        );

        (merged, report)
    }

    fn group_by_climate_id<'a>(
        &self,
        stations: &'a [StationRecord],
    ) -> HashMap<String, Vec<&'a StationRecord>> {
        let mut grouped: HashMap<String, Vec<&StationRecord>> = HashMap::new();
        for station in stations {
            grouped
                .entry(normalize_climate_id(&station.climate_id))
                .or_default()
                .push(station);
        }
        grouped
    }
}

impl Default for RecordJoiner {
    fn default() -> Self {
        Self::new()
    }
}
