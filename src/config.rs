//! Run configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional file,
//! then `ECCC__SECTION__KEY` environment overrides.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::Result;
use crate::utils::constants::*;

/// What to do when a city name matches more than one inventory row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    /// Take the first matching row and log every candidate.
    #[default]
    First,
    /// Refuse to pick.
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub path: PathBuf,
    pub header_lines: usize,
    pub ambiguity: AmbiguityPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FetchConfig {
    pub base_url: String,
    pub month: u32,
    pub day: u32,
    pub timeframe: u32,
    /// The target year plus the two years it is compared against, at least.
    #[validate(range(min = 3))]
    pub years: u32,
    pub accept_invalid_certs: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub bucket: String,
    pub folder: String,
    pub access_key_var: String,
    pub secret_key_var: String,
    pub require_credentials: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub workbook_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub directory: DirectoryConfig,
    pub fetch: FetchConfig,
    pub storage: StorageConfig,
    pub export: ExportConfig,
}

impl PipelineConfig {
    /// Defaults, overlaid with `file` if given, overlaid with the environment.
    ///
    /// Fails with `Validation` when `fetch.years` is below 3.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::defaults_builder()?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.fetch.validate()?;
        Ok(config)
    }

    fn defaults_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("directory.path", STATION_INVENTORY_FILE)?
            .set_default("directory.header_lines", INVENTORY_HEADER_LINES as u64)?
            .set_default("directory.ambiguity", "first")?
            .set_default("fetch.base_url", DEFAULT_BASE_URL)?
            .set_default("fetch.month", DEFAULT_FETCH_MONTH as u64)?
            .set_default("fetch.day", DEFAULT_FETCH_DAY as u64)?
            .set_default("fetch.timeframe", DEFAULT_TIMEFRAME as u64)?
            .set_default("fetch.years", DEFAULT_YEARS_FETCHED as u64)?
            .set_default("fetch.accept_invalid_certs", true)?
            .set_default("fetch.timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("storage.root", DEFAULT_STORAGE_ROOT)?
            .set_default("storage.bucket", DEFAULT_BUCKET)?
            .set_default("storage.folder", DEFAULT_FOLDER)?
            .set_default("storage.access_key_var", ACCESS_KEY_VAR)?
            .set_default("storage.secret_key_var", SECRET_KEY_VAR)?
            .set_default("storage.require_credentials", true)?
            .set_default("export.workbook_path", WORKBOOK_FILE)?)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            directory: DirectoryConfig {
                path: PathBuf::from(STATION_INVENTORY_FILE),
                header_lines: INVENTORY_HEADER_LINES,
                ambiguity: AmbiguityPolicy::First,
            },
            fetch: FetchConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                month: DEFAULT_FETCH_MONTH,
                day: DEFAULT_FETCH_DAY,
                timeframe: DEFAULT_TIMEFRAME,
                years: DEFAULT_YEARS_FETCHED,
                accept_invalid_certs: true,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            storage: StorageConfig {
                root: PathBuf::from(DEFAULT_STORAGE_ROOT),
                bucket: DEFAULT_BUCKET.to_string(),
                folder: DEFAULT_FOLDER.to_string(),
                access_key_var: ACCESS_KEY_VAR.to_string(),
                secret_key_var: SECRET_KEY_VAR.to_string(),
                require_credentials: true,
            },
            export: ExportConfig {
                workbook_path: PathBuf::from(WORKBOOK_FILE),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builder_defaults_match_default_impl() {
        let built: PipelineConfig = PipelineConfig::defaults_builder()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        let default = PipelineConfig::default();

        assert_eq!(built.directory.path, default.directory.path);
        assert_eq!(built.directory.header_lines, 3);
        assert_eq!(built.directory.ambiguity, AmbiguityPolicy::First);
        assert_eq!(built.fetch.month, 1);
        assert_eq!(built.fetch.day, 14);
        assert_eq!(built.fetch.timeframe, 2);
        assert_eq!(built.fetch.years, 3);
        assert_eq!(built.storage.bucket, "weather-wave");
        assert_eq!(built.storage.folder, "wave");
        assert_eq!(built.export.workbook_path, default.export.workbook_path);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file: NamedTempFile = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[storage]\nbucket = \"archive\"\n\n[directory]\nambiguity = \"fail\"").unwrap();

        let config = PipelineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.storage.bucket, "archive");
        assert_eq!(config.storage.folder, "wave");
        assert_eq!(config.directory.ambiguity, AmbiguityPolicy::Fail);
    }

    #[test]
    fn test_too_few_fetched_years_rejected() {
        for years in [0, 2] {
            let mut file: NamedTempFile =
                tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
            writeln!(file, "[fetch]\nyears = {}", years).unwrap();

            let err = PipelineConfig::load(Some(file.path())).unwrap_err();
            assert!(matches!(err, ProcessingError::Validation(_)));
            assert_eq!(err.exit_code(), 2);
        }

        let mut file: NamedTempFile = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[fetch]\nyears = 4").unwrap();
        assert_eq!(PipelineConfig::load(Some(file.path())).unwrap().fetch.years, 4);
    }
}
