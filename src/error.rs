use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Pipeline stage that raised an error, carried into user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    Fetching,
    Joining,
    Cleaning,
    Persisting,
    Querying,
    Reporting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resolving => "station lookup",
            Stage::Fetching => "observation fetch",
            Stage::Joining => "join",
            Stage::Cleaning => "cleaning",
            Stage::Persisting => "persistence",
            Stage::Querying => "query",
            Stage::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InputValidation(String),

    #[error("No station ID found for city: {city}")]
    StationNotFound { city: String },

    #[error("City {city} matches {count} stations ({candidates})")]
    AmbiguousStation {
        city: String,
        count: usize,
        candidates: String,
    },

    #[error("Failed to load station directory {path}: {message}")]
    DirectoryLoad { path: PathBuf, message: String },

    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Request for station {station_id}, year {year} failed")]
    Fetch {
        station_id: u32,
        year: i32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request for station {station_id}, year {year} returned status {status}")]
    FetchStatus {
        station_id: u32,
        year: i32,
        status: reqwest::StatusCode,
    },

    #[error("Malformed observation data for station {station_id}, year {year}: {message}")]
    MalformedResponse {
        station_id: u32,
        year: i32,
        message: String,
    },

    #[error("Storage credentials missing: environment variable {variable} is not set")]
    MissingCredentials { variable: String },

    #[error("Blob storage error for key {key}: {message}")]
    Persistence { key: String, message: String },

    #[error("Workbook export to {path} failed: {message}")]
    Export { path: PathBuf, message: String },

    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("No data for {city} in {year}")]
    NoData { city: String, year: i32 },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Tag an error with the pipeline stage it surfaced in.
    pub fn at(self, stage: Stage) -> Self {
        match self {
            already @ ProcessingError::StageFailed { .. } => already,
            other => ProcessingError::StageFailed {
                stage,
                source: Box::new(other),
            },
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            ProcessingError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The error underneath any stage tagging.
    pub fn root(&self) -> &ProcessingError {
        match self {
            ProcessingError::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_input_error(&self) -> bool {
        matches!(
            self.root(),
            ProcessingError::InputValidation(_)
                | ProcessingError::Validation(_)
                | ProcessingError::AmbiguousStation { .. }
        )
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_input_error() {
            2
        } else {
            1
        }
    }
}
