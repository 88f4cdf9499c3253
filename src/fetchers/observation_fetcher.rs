use crate::config::FetchConfig;
use crate::error::{ProcessingError, Result};
use crate::models::ObservationRecord;
use crate::readers::ObservationReader;
use futures::future::try_join_all;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// One request to the bulk daily data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub station_id: u32,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub timeframe: u32,
}

impl FetchRequest {
    pub fn query_pairs(&self) -> [(&'static str, String); 6] {
        [
            ("format", "csv".to_string()),
            ("stationID", self.station_id.to_string()),
            ("Year", self.year.to_string()),
            ("Month", self.month.to_string()),
            ("Day", self.day.to_string()),
            ("timeframe", self.timeframe.to_string()),
        ]
    }
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "station {} year {} ({}-{:02}, timeframe {})",
            self.station_id, self.year, self.month, self.day, self.timeframe
        )
    }
}

/// Where raw station-year CSV bodies come from.
pub trait ObservationSource: Send + Sync {
    fn fetch_body(&self, request: &FetchRequest) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// The climate.weather.gc.ca bulk data endpoint.
pub struct HttpObservationSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpObservationSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        // The service's certificate chain does not validate everywhere; this is opt-out via config.
        let client = reqwest::Client::builder()
            .user_agent(concat!("eccc-processor/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(ProcessingError::HttpClient)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

impl ObservationSource for HttpObservationSource {
    async fn fetch_body(&self, request: &FetchRequest) -> Result<Vec<u8>> {
        debug!(url = %self.base_url, %request, "requesting observations");

        let response = self
            .client
            .get(&self.base_url)
            .query(&request.query_pairs())
            .send()
            .await
            .map_err(|source| ProcessingError::Fetch {
                station_id: request.station_id,
                year: request.year,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProcessingError::FetchStatus {
                station_id: request.station_id,
                year: request.year,
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ProcessingError::Fetch {
                station_id: request.station_id,
                year: request.year,
                source,
            })?;

        Ok(body.to_vec())
    }
}

/// Retrieves and parses daily observations for whole station-years.
pub struct ObservationFetcher<S> {
    source: S,
    reader: ObservationReader,
    month: u32,
    day: u32,
    timeframe: u32,
}

impl<S: ObservationSource> ObservationFetcher<S> {
    pub fn new(source: S, config: &FetchConfig) -> Self {
        Self {
            source,
            reader: ObservationReader::new(),
            month: config.month,
            day: config.day,
            timeframe: config.timeframe,
        }
    }

    pub fn request(&self, station_id: u32, year: i32) -> FetchRequest {
        FetchRequest {
            station_id,
            year,
            month: self.month,
            day: self.day,
            timeframe: self.timeframe,
        }
    }

    /// Fetch one station-year with the configured daily parameters
    pub async fn fetch(&self, station_id: u32, year: i32) -> Result<Vec<ObservationRecord>> {
        self.fetch_request(&self.request(station_id, year)).await
    }

    pub async fn fetch_request(&self, request: &FetchRequest) -> Result<Vec<ObservationRecord>> {
        let body = self.source.fetch_body(request).await?;

        let records = self.reader.parse_bytes(&body).map_err(|e| {
            ProcessingError::MalformedResponse {
                station_id: request.station_id,
                year: request.year,
                message: e.to_string(),
            }
        })?;

        debug!(%request, rows = records.len(), "parsed observations");
        Ok(records)
    }

    /// Fetch every year or none: the first failure is returned and no partial set escapes.
    ///
    /// Requests run concurrently; results are folded in the order of `years`.
    pub async fn fetch_years(
        &self,
        station_id: u32,
        years: &[i32],
    ) -> Result<Vec<ObservationRecord>> {
        let batches = try_join_all(years.iter().map(|&year| self.fetch(station_id, year))).await?;

        let combined = batches
            .into_iter()
            .fold(Vec::new(), |acc: Vec<ObservationRecord>, batch| {
                acc.into_iter().chain(batch).collect()
            });

        info!(
            station_id,
            years = ?years,
            rows = combined.len(),
            "fetched observation years"
        );
        Ok(combined)
    }
}
