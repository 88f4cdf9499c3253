use crate::analyzers::{StatisticsEngine, StatisticsReport};
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result, Stage};
use crate::fetchers::{ObservationFetcher, ObservationSource};
use crate::models::{CleanedRecord, QueryScope};
use crate::processors::{CleaningReport, JoinReport, RecordCleaner, RecordJoiner};
use crate::readers::StationDirectory;
use crate::utils::filename::filtered_data_key;
use crate::utils::progress::ProgressReporter;
use crate::writers::{BlobStore, CsvWriter, WorkbookWriter};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Resolving,
    Fetching { years: usize },
    Joining,
    Cleaning,
    Persisting,
    Querying,
    Reporting,
    Done,
    Failed(Stage),
}

impl PipelineState {
    fn stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Resolving => Some(Stage::Resolving),
            PipelineState::Fetching { .. } => Some(Stage::Fetching),
            PipelineState::Joining => Some(Stage::Joining),
            PipelineState::Cleaning => Some(Stage::Cleaning),
            PipelineState::Persisting => Some(Stage::Persisting),
            PipelineState::Querying => Some(Stage::Querying),
            PipelineState::Reporting => Some(Stage::Reporting),
            PipelineState::Idle | PipelineState::Done | PipelineState::Failed(_) => None,
        }
    }
}

/// Rows dropped along the way, per step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineDiagnostics {
    pub join: JoinReport,
    pub cleaning: CleaningReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub station_id: u32,
    pub years: Vec<i32>,
    pub blob_key: String,
    pub workbook_path: Option<PathBuf>,
    pub diagnostics: PipelineDiagnostics,
    pub report: StatisticsReport,
}

impl PipelineOutcome {
    pub fn summary(&self) -> String {
        let workbook = self
            .workbook_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "skipped".to_string());

        format!(
            "=== Run Summary ===\n\
            Station ID: {}\n\
            Years Fetched: {:?}\n\
            Observations: {} fetched, {} unmatched, {} joined\n\
            {}\n\
            Stored As: {}\n\
            Workbook: {}\n\n\
            {}",
            self.station_id,
            self.years,
            self.diagnostics.join.observations_in,
            self.diagnostics.join.unmatched_observations,
            self.diagnostics.join.merged_rows,
            self.diagnostics.cleaning.summary(),
            self.blob_key,
            workbook,
            self.report.summary()
        )
    }
}

/// Runs one (city, year) query end to end: resolve, fetch, join, clean,
/// persist, read back, report.
///
/// Any stage failure stops the run; the error names the stage.
pub struct Pipeline<S, B> {
    config: PipelineConfig,
    directory: StationDirectory,
    fetcher: ObservationFetcher<S>,
    store: B,
    joiner: RecordJoiner,
    cleaner: RecordCleaner,
    csv_writer: CsvWriter,
    workbook_writer: WorkbookWriter,
    engine: StatisticsEngine,
    skip_workbook: bool,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl<S: ObservationSource, B: BlobStore> Pipeline<S, B> {
    pub fn new(config: PipelineConfig, directory: StationDirectory, source: S, store: B) -> Self {
        let fetcher = ObservationFetcher::new(source, &config.fetch);
        Self {
            config,
            directory,
            fetcher,
            store,
            joiner: RecordJoiner::new(),
            cleaner: RecordCleaner::new(),
            csv_writer: CsvWriter::new(),
            workbook_writer: WorkbookWriter::new(),
            engine: StatisticsEngine::new(),
            skip_workbook: false,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    /// Load the station inventory named in `config` and build the pipeline.
    pub fn from_config(config: PipelineConfig, source: S, store: B) -> Result<Self> {
        let directory =
            StationDirectory::load(&config.directory.path, config.directory.header_lines)
                .map_err(|e| e.at(Stage::Resolving))?;
        Ok(Self::new(config, directory, source, store))
    }

    pub fn with_skip_workbook(mut self, skip_workbook: bool) -> Self {
        self.skip_workbook = skip_workbook;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state entered during the last run, starting from `Idle`
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    fn enter(&mut self, state: PipelineState, progress: Option<&ProgressReporter>) {
        debug!(from = ?self.state, to = ?state, "pipeline transition");
        self.state = state;
        self.history.push(state);
        if let (Some(p), Some(stage)) = (progress, state.stage()) {
            p.enter_stage(stage);
        }
    }

    /// Record the failure against the current stage and tag the error with it.
    fn fail(&mut self, error: ProcessingError) -> ProcessingError {
        let stage = self.state.stage().unwrap_or(Stage::Resolving);
        self.enter(PipelineState::Failed(stage), None);
        error.at(stage)
    }

    pub async fn run(
        &mut self,
        scope: &QueryScope,
        today: NaiveDate,
        progress: Option<&ProgressReporter>,
    ) -> Result<PipelineOutcome> {
        self.state = PipelineState::Idle;
        self.history = vec![PipelineState::Idle];

        // Fields are public, so neither may have come through a validating constructor
        scope.validate()?;
        self.config.fetch.validate()?;

        match self.execute(scope, today, progress).await {
            Ok(outcome) => {
                self.enter(PipelineState::Done, progress);
                if let Some(p) = progress {
                    p.finish_with_message(&format!(
                        "Processed {} {} ({} rows kept)",
                        scope.city, scope.year, outcome.diagnostics.cleaning.rows_out
                    ));
                }
                Ok(outcome)
            }
            Err(error) => {
                if let Some(p) = progress {
                    p.abandon();
                }
                Err(self.fail(error))
            }
        }
    }

    async fn execute(
        &mut self,
        scope: &QueryScope,
        today: NaiveDate,
        progress: Option<&ProgressReporter>,
    ) -> Result<PipelineOutcome> {
        self.enter(PipelineState::Resolving, progress);
        let station_id = self
            .directory
            .resolve(&scope.city, self.config.directory.ambiguity)?
            .station_id;
        info!("Resolved {} to station {}", scope.city, station_id);

        let years = scope.years(self.config.fetch.years);
        self.enter(PipelineState::Fetching { years: years.len() }, progress);
        let observations = self.fetcher.fetch_years(station_id, &years).await?;

        self.enter(PipelineState::Joining, progress);
        let (merged, join) = self.joiner.join(self.directory.stations(), &observations);

        self.enter(PipelineState::Cleaning, progress);
        let (cleaned, cleaning) = self.cleaner.clean(merged, today)?;

        self.enter(PipelineState::Persisting, progress);
        let (blob_key, workbook_path) = self.persist(scope, &cleaned)?;

        self.enter(PipelineState::Querying, progress);
        let persisted = self.engine.load(&self.store, &blob_key)?;

        self.enter(PipelineState::Reporting, progress);
        let report = self.engine.analyze(&persisted, scope);

        Ok(PipelineOutcome {
            station_id,
            years,
            blob_key,
            workbook_path,
            diagnostics: PipelineDiagnostics { join, cleaning },
            report,
        })
    }

    /// Blob first; the workbook is only written once the blob is stored.
    fn persist(
        &self,
        scope: &QueryScope,
        cleaned: &[CleanedRecord],
    ) -> Result<(String, Option<PathBuf>)> {
        let key = filtered_data_key(&self.config.storage.folder, scope);
        self.csv_writer.write_csv(&self.store, cleaned, &key)?;

        if self.skip_workbook {
            return Ok((key, None));
        }

        let destination = self.config.export.workbook_path.clone();
        let sheets = self.workbook_writer.write_workbook(cleaned, &destination)?;
        Ok((key, (!sheets.is_empty()).then_some(destination)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::FetchRequest;
    use crate::models::StationRecord;
    use crate::writers::MemoryBlobStore;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const HEADER: &str = "\"Longitude (x)\",\"Latitude (y)\",\"Station Name\",\"Climate ID\",\"Date/Time\",\"Year\",\"Month\",\"Day\",\"Max Temp (°C)\",\"Min Temp (°C)\",\"Mean Temp (°C)\"";

    #[derive(Clone, Default)]
    struct StubSource {
        bodies: HashMap<i32, String>,
        requests: Arc<Mutex<Vec<FetchRequest>>>,
    }

    impl ObservationSource for StubSource {
        async fn fetch_body(&self, request: &FetchRequest) -> Result<Vec<u8>> {
            self.requests.lock().unwrap().push(*request);
            self.bodies
                .get(&request.year)
                .map(|b| b.clone().into_bytes())
                .ok_or_else(|| ProcessingError::MalformedResponse {
                    station_id: request.station_id,
                    year: request.year,
                    message: "no body".to_string(),
                })
        }
    }

    fn body(year: i32, mean: f64) -> String {
        format!(
            "{HEADER}\n\
            \"-79.40\",\"43.67\",\"TORONTO\",\"6158355\",\"{year}-01-15\",\"{year}\",\"01\",\"15\",\"{max}\",\"{min}\",\"{mean}\"\n\
            \"-79.40\",\"43.67\",\"TORONTO\",\"6158355\",\"{year}-02-15\",\"{year}\",\"02\",\"15\",\"\",\"-9.0\",\"-4.0\"\n",
            max = mean + 5.0,
            min = mean - 5.0,
        )
    }

    fn directory() -> StationDirectory {
        StationDirectory::from_records(vec![StationRecord::new(
            "TORONTO".to_string(),
            "ONTARIO".to_string(),
            "6158355",
            31688,
            None,
            None,
            43.67,
            -79.4,
        )])
    }

    fn pipeline(source: StubSource) -> Pipeline<StubSource, MemoryBlobStore> {
        Pipeline::new(
            PipelineConfig::default(),
            directory(),
            source,
            MemoryBlobStore::new(),
        )
        .with_skip_workbook(true)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_run_walks_every_state() {
        let source = StubSource {
            bodies: [(2020, body(2020, 2.0)), (2019, body(2019, 1.0)), (2018, body(2018, 3.0))]
                .into_iter()
                .collect(),
            ..StubSource::default()
        };
        let mut pipeline = pipeline(source);
        let scope = QueryScope::new("toronto", 2020).unwrap();

        let outcome = pipeline.run(&scope, today(), None).await.unwrap();

        assert_eq!(
            pipeline.history(),
            &[
                PipelineState::Idle,
                PipelineState::Resolving,
                PipelineState::Fetching { years: 3 },
                PipelineState::Joining,
                PipelineState::Cleaning,
                PipelineState::Persisting,
                PipelineState::Querying,
                PipelineState::Reporting,
                PipelineState::Done,
            ]
        );
        assert_eq!(outcome.station_id, 31688);
        assert_eq!(outcome.years, vec![2020, 2019, 2018]);
        assert_eq!(outcome.blob_key, "wave/TORONTO/2020/filtered_data.csv");
        assert_eq!(outcome.workbook_path, None);
        assert_eq!(outcome.diagnostics.cleaning.rows_in, 6);
        assert_eq!(outcome.diagnostics.cleaning.missing_temperatures, 3);
        assert_eq!(outcome.diagnostics.cleaning.rows_out, 3);
        assert_eq!(pipeline.store().keys(), vec![outcome.blob_key.clone()]);
    }

    #[tokio::test]
    async fn test_unknown_city_fails_before_fetch() {
        let source = StubSource::default();
        let requests = source.requests.clone();
        let mut pipeline = pipeline(source);
        let scope = QueryScope::new("atlantis", 2020).unwrap();

        let err = pipeline.run(&scope, today(), None).await.unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Resolving));
        assert!(matches!(err.root(), ProcessingError::StationNotFound { .. }));
        assert_eq!(pipeline.state(), PipelineState::Failed(Stage::Resolving));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_year_fails_fetch_and_persists_nothing() {
        let source = StubSource {
            bodies: [(2020, body(2020, 2.0)), (2018, body(2018, 3.0))]
                .into_iter()
                .collect(),
            ..StubSource::default()
        };
        let mut pipeline = pipeline(source);
        let scope = QueryScope::new("TORONTO", 2020).unwrap();

        let err = pipeline.run(&scope, today(), None).await.unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Fetching));
        assert_eq!(pipeline.state(), PipelineState::Failed(Stage::Fetching));
        assert!(pipeline.store().keys().is_empty());
    }

    #[tokio::test]
    async fn test_hand_built_scope_is_still_validated() {
        let mut pipeline = pipeline(StubSource::default());
        let scope = QueryScope {
            city: "TORONTO".to_string(),
            year: 2001,
        };

        let err = pipeline.run(&scope, today(), None).await.unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn test_zero_fetched_years_is_rejected_before_fetch() {
        let source = StubSource::default();
        let requests = source.requests.clone();
        let mut config = PipelineConfig::default();
        config.fetch.years = 0;
        let mut pipeline = Pipeline::new(config, directory(), source, MemoryBlobStore::new())
            .with_skip_workbook(true);
        let scope = QueryScope::new("TORONTO", 2020).unwrap();

        let err = pipeline.run(&scope, today(), None).await.unwrap_err();

        assert!(err.is_input_error());
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(requests.lock().unwrap().is_empty());
        assert!(pipeline.store().keys().is_empty());
    }
}
