use crate::error::{ProcessingError, Result};
use crate::models::{CleanedRecord, MergedRecord};
use crate::utils::constants::DATE_FORMATS;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub rows_in: usize,
    pub future_dated: usize,
    pub missing_temperatures: usize,
    pub rows_out: usize,
}

impl CleaningReport {
    pub fn dropped(&self) -> usize {
        self.rows_in - self.rows_out
    }

    pub fn summary(&self) -> String {
        let kept_pct = if self.rows_in == 0 {
            0.0
        } else {
            100.0 * self.rows_out as f64 / self.rows_in as f64
        };

        format!(
            "=== Cleaning Report ===\n\
            Rows In: {}\n\
            Future-dated Rows Dropped: {}\n\
            Rows Missing Max/Min Dropped: {}\n\
            Rows Kept: {} ({:.1}%)",
            self.rows_in, self.future_dated, self.missing_temperatures, self.rows_out, kept_pct
        )
    }
}

/// Parse a `Date/Time` cell into a calendar date
pub fn parse_observation_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }

    Err(ProcessingError::InvalidFormat(format!(
        "Invalid date format: '{}'",
        raw
    )))
}

pub struct RecordCleaner;

impl RecordCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Drop future-dated rows and rows missing max or min temperature, then project.
    ///
    /// A row is counted under `future_dated` if it fails the date filter,
    /// otherwise under `missing_temperatures`.
    pub fn clean(
        &self,
        merged: Vec<MergedRecord>,
        today: NaiveDate,
    ) -> Result<(Vec<CleanedRecord>, CleaningReport)> {
        let mut report = CleaningReport {
            rows_in: merged.len(),
            ..CleaningReport::default()
        };
        let mut cleaned = Vec::with_capacity(merged.len());

        for record in merged {
            let date = parse_observation_date(&record.observation.date_time)?;

            if date > today {
                debug!(date = %date, "dropping future-dated row");
                report.future_dated += 1;
                continue;
            }

            if !record.observation.has_extremes() {
                report.missing_temperatures += 1;
                continue;
            }

            cleaned.push(CleanedRecord::project(record, date)?);
        }

        report.rows_out = cleaned.len();

        info!(
            "Cleaning complete: {} -> {} rows ({} future-dated, {} missing max/min)",
            report.rows_in, report.rows_out, report.future_dated, report.missing_temperatures
        );

        Ok((cleaned, report))
    }
}

impl Default for RecordCleaner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ObservationRecord, StationRecord};
    use pretty_assertions::assert_eq;

    fn merged(date: &str, max: Option<f64>, min: Option<f64>) -> MergedRecord {
        let year = date[..4].parse().unwrap();
        let month = date[5..7].parse().unwrap();
        MergedRecord::new(
            StationRecord::new(
                "TORONTO".to_string(),
                "ONTARIO".to_string(),
                "6158355",
                31688,
                Some("71508".to_string()),
                Some("XTO".to_string()),
                43.67,
                -79.4,
            ),
            ObservationRecord::new(
                "6158355",
                date.to_string(),
                year,
                month,
                max,
                min,
                Some(0.5),
            ),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, 15).unwrap()
    }

    #[test]
    fn test_parse_observation_date() {
        let expected = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(parse_observation_date("2020-01-02").unwrap(), expected);
        assert_eq!(parse_observation_date(" 2020-01-02 00:00").unwrap(), expected);
        assert!(matches!(
            parse_observation_date("02/01/2020"),
            Err(ProcessingError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_future_rows_dropped_today_kept() {
        let rows = vec![
            merged("2020-06-14", Some(20.0), Some(10.0)),
            merged("2020-06-15", Some(21.0), Some(11.0)),
            merged("2020-06-16", Some(22.0), Some(12.0)),
        ];

        let (cleaned, report) = RecordCleaner::new().clean(rows, today()).unwrap();
        assert_eq!(cleaned.len(), 2);
        assert_eq!(report.future_dated, 1);
        assert!(cleaned.iter().all(|r| r.date <= today()));
    }

    #[test]
    fn test_incomplete_rows_dropped() {
        let rows = vec![
            merged("2020-01-01", Some(2.0), Some(-3.0)),
            merged("2020-01-02", None, Some(-3.0)),
            merged("2020-01-03", Some(2.0), None),
            merged("2020-01-04", None, None),
        ];

        let (cleaned, report) = RecordCleaner::new().clean(rows, today()).unwrap();
        assert_eq!(cleaned.len(), 1);
        assert_eq!(report.missing_temperatures, 3);
        assert_eq!(report.dropped(), 3);
    }

    #[test]
    fn test_missing_mean_is_kept() {
        let mut row = merged("2020-01-01", Some(2.0), Some(-3.0));
        row.observation.mean_temp = None;

        let (cleaned, _) = RecordCleaner::new().clean(vec![row], today()).unwrap();
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].mean_temp, None);
    }

    #[test]
    fn test_unparseable_date_is_error() {
        let row = merged("2020-01-01", Some(2.0), Some(-3.0));
        let mut bad = row.clone();
        bad.observation.date_time = "not a date".to_string();

        let err = RecordCleaner::new()
            .clean(vec![row, bad], today())
            .unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidFormat(_)));
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let rows = vec![
            merged("2020-01-01", Some(2.0), Some(-3.0)),
            merged("2020-01-02", None, Some(-3.0)),
            merged("2020-03-05", Some(8.0), Some(1.0)),
            merged("2020-12-24", Some(1.0), Some(-1.0)),
        ];

        let cleaner = RecordCleaner::new();
        let (once, _) = cleaner.clean(rows, today()).unwrap();
        let again_input: Vec<MergedRecord> = once.iter().map(MergedRecord::from).collect();
        let (twice, report) = cleaner.clean(again_input, today()).unwrap();

        assert_eq!(once, twice);
        assert_eq!(report.dropped(), 0);
    }

    #[test]
    fn test_empty_input() {
        let (cleaned, report) = RecordCleaner::new().clean(Vec::new(), today()).unwrap();
        assert!(cleaned.is_empty());
        assert_eq!(report, CleaningReport::default());
        assert!(report.summary().contains("Rows Kept: 0 (0.0%)"));
    }
}
