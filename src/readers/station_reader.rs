use crate::config::AmbiguityPolicy;
use crate::error::{ProcessingError, Result};
use crate::models::StationRecord;
use crate::utils::constants::INVENTORY_HEADER_LINES;
use crate::utils::encoding::{decode_csv_bytes, skip_lines};
use std::path::Path;
use tracing::{debug, warn};
use validator::Validate;

pub struct StationReader {
    header_lines: usize,
}

impl StationReader {
    pub fn new() -> Self {
        Self {
            header_lines: INVENTORY_HEADER_LINES,
        }
    }

    pub fn with_header_lines(header_lines: usize) -> Self {
        Self { header_lines }
    }

    /// Read the station inventory file
    pub fn read_stations(&self, path: &Path) -> Result<Vec<StationRecord>> {
        let bytes = std::fs::read(path).map_err(|e| ProcessingError::DirectoryLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        self.parse_stations(&decode_csv_bytes(&bytes))
            .map_err(|e| ProcessingError::DirectoryLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Parse inventory text: descriptive preamble, then a header row, then stations
    pub fn parse_stations(&self, text: &str) -> Result<Vec<StationRecord>> {
        let table = skip_lines(text, self.header_lines);
        if table.trim().is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "No table found after {} header lines",
                self.header_lines
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(table.as_bytes());

        let mut stations = Vec::new();
        let mut rejected = 0;
        for row in reader.deserialize() {
            let station: StationRecord = row?;
            match station.validate() {
                Ok(()) => stations.push(station),
                Err(e) => {
                    debug!(station = %station.name, error = %e, "skipping invalid inventory row");
                    rejected += 1;
                }
            }
        }

        if rejected > 0 {
            warn!("Skipped {} inventory rows with invalid name or coordinates", rejected);
        }
        debug!(stations = stations.len(), "parsed station inventory");
        Ok(stations)
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// The station inventory, loaded once per run.
#[derive(Debug, Clone)]
pub struct StationDirectory {
    stations: Vec<StationRecord>,
}

impl StationDirectory {
    pub fn load(path: &Path, header_lines: usize) -> Result<Self> {
        let stations = StationReader::with_header_lines(header_lines).read_stations(path)?;
        Ok(Self { stations })
    }

    pub fn from_records(stations: Vec<StationRecord>) -> Self {
        Self { stations }
    }

    pub fn stations(&self) -> &[StationRecord] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Exact, case-sensitive match of `name` against an already-uppercased city.
    pub fn resolve(&self, city_upper: &str, policy: AmbiguityPolicy) -> Result<&StationRecord> {
        let matches: Vec<&StationRecord> = self
            .stations
            .iter()
            .filter(|s| s.matches_name(city_upper))
            .collect();

        match matches.as_slice() {
            [] => Err(ProcessingError::StationNotFound {
                city: city_upper.to_string(),
            }),
            [only] => Ok(*only),
            [first, ..] => {
                let candidates = matches
                    .iter()
                    .map(|s| format!("{} ({})", s.station_id, s.climate_id))
                    .collect::<Vec<_>>()
                    .join(", ");

                match policy {
                    AmbiguityPolicy::First => {
                        warn!(
                            city = city_upper,
                            chosen = first.station_id,
                            %candidates,
                            "several stations share this name; using the first"
                        );
                        Ok(*first)
                    }
                    AmbiguityPolicy::Fail => Err(ProcessingError::AmbiguousStation {
                        city: city_upper.to_string(),
                        count: matches.len(),
                        candidates,
                    }),
                }
            }
        }
    }

    /// Case-insensitive substring search on station names
    pub fn find_by_name(&self, pattern: &str) -> Vec<&StationRecord> {
        let pattern = pattern.to_uppercase();
        self.stations
            .iter()
            .filter(|s| s.name.to_uppercase().contains(&pattern))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const INVENTORY: &str = "\
Modified Date: 2023-01-10 23:30 UTC
Disclaimer: The data are provided as is
Station Inventory
\"Name\",\"Province\",\"Climate ID\",\"Station ID\",\"WMO ID\",\"TC ID\",\"Latitude (y)\",\"Longitude (x)\",\"Elevation (m)\"
\"TORONTO\",\"ONTARIO\",\"6158355\",\"31688\",\"71508\",\"XTO\",\"43.67\",\"-79.4\",\"112.5\"
\"TORONTO CITY\",\"ONTARIO\",\"6158350\",\"5051\",\"\",\"\",\"43.67\",\"-79.4\",\"113\"
\"OTTAWA CDA\",\"ONTARIO\",\"6105976\",\"4333\",\"71063\",\"\",\"45.38\",\"-75.72\",\"79\"
";

    #[test]
    fn test_parse_inventory() {
        let reader = StationReader::new();
        let stations = reader.parse_stations(INVENTORY).unwrap();

        assert_eq!(stations.len(), 3);
        assert_eq!(stations[0].name, "TORONTO");
        assert_eq!(stations[0].station_id, 31688);
        assert_eq!(stations[0].climate_id, "6158355");
        assert_eq!(stations[0].wmo_id.as_deref(), Some("71508"));
        assert_eq!(stations[1].wmo_id, None);
        assert_eq!(stations[1].tc_id, None);
        assert!((stations[2].longitude - -75.72).abs() < 1e-9);
    }

    #[test]
    fn test_decimal_degree_headers_are_accepted() {
        let text = "a\nb\nc\n\
Name,Province,Climate ID,Station ID,WMO ID,TC ID,Latitude (Decimal Degrees),Longitude (Decimal Degrees)\n\
HALIFAX,NOVA SCOTIA,8202251,6358,,,44.66,-63.57\n";
        let stations = StationReader::new().parse_stations(text).unwrap();
        assert_eq!(stations.len(), 1);
        assert!((stations[0].latitude - 44.66).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_rows_are_skipped() {
        let text = "a\nb\nc\n\
Name,Province,Climate ID,Station ID,WMO ID,TC ID,Latitude (y),Longitude (x)\n\
HALIFAX,NOVA SCOTIA,8202251,6358,,,44.66,-63.57\n\
BROKEN,NOVA SCOTIA,8202252,6359,,,144.66,-63.57\n";
        let stations = StationReader::new().parse_stations(text).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].name, "HALIFAX");
    }

    #[test]
    fn test_read_inventory_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        write!(temp_file, "{}", INVENTORY)?;

        let directory = StationDirectory::load(temp_file.path(), 3)?;
        assert_eq!(directory.len(), 3);
        Ok(())
    }

    #[test]
    fn test_unreadable_inventory_is_directory_error() {
        let err = StationDirectory::load(Path::new("/no/such/inventory.csv"), 3).unwrap_err();
        assert!(matches!(err, ProcessingError::DirectoryLoad { .. }));
    }

    #[test]
    fn test_malformed_inventory_is_directory_error() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        write!(temp_file, "x\ny\nz\nName,Province\nTORONTO,ONTARIO\n")?;

        let err = StationDirectory::load(temp_file.path(), 3).unwrap_err();
        assert!(matches!(err, ProcessingError::DirectoryLoad { .. }));
        Ok(())
    }

    #[test]
    fn test_resolve_exact_match_only() {
        let stations = StationReader::new().parse_stations(INVENTORY).unwrap();
        let directory = StationDirectory::from_records(stations);

        let station = directory.resolve("TORONTO", AmbiguityPolicy::First).unwrap();
        assert_eq!(station.station_id, 31688);

        let err = directory
            .resolve("Toronto", AmbiguityPolicy::First)
            .unwrap_err();
        assert!(matches!(err, ProcessingError::StationNotFound { .. }));

        let err = directory
            .resolve("MONTREAL", AmbiguityPolicy::First)
            .unwrap_err();
        assert!(matches!(err, ProcessingError::StationNotFound { .. }));
    }

    #[test]
    fn test_resolve_ambiguity_policies() {
        let mut stations = StationReader::new().parse_stations(INVENTORY).unwrap();
        let mut duplicate = stations[0].clone();
        duplicate.station_id = 99999;
        stations.push(duplicate);
        let directory = StationDirectory::from_records(stations);

        let first = directory.resolve("TORONTO", AmbiguityPolicy::First).unwrap();
        assert_eq!(first.station_id, 31688);

        let err = directory
            .resolve("TORONTO", AmbiguityPolicy::Fail)
            .unwrap_err();
        match err {
            ProcessingError::AmbiguousStation { count, .. } => assert_eq!(count, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_find_by_name() {
        let stations = StationReader::new().parse_stations(INVENTORY).unwrap();
        let directory = StationDirectory::from_records(stations);

        assert_eq!(directory.find_by_name("toronto").len(), 2);
        assert_eq!(directory.find_by_name("cda").len(), 1);
        assert!(directory.find_by_name("yukon").is_empty());
    }
}
