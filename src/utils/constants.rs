/// Bulk daily data service
pub const DEFAULT_BASE_URL: &str = "https://climate.weather.gc.ca/climate_data/bulk_data_e.html";
pub const DEFAULT_FETCH_MONTH: u32 = 1;
pub const DEFAULT_FETCH_DAY: u32 = 14;
/// `timeframe=2` selects daily granularity
pub const DEFAULT_TIMEFRAME: u32 = 2;
pub const DEFAULT_YEARS_FETCHED: u32 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// The service has no daily coverage before this year
pub const EARLIEST_SUPPORTED_YEAR: i32 = 2018;

/// Station inventory
pub const STATION_INVENTORY_FILE: &str = "Station_Inventory_EN.csv";
pub const INVENTORY_HEADER_LINES: usize = 3;

/// Storage
pub const DEFAULT_BUCKET: &str = "weather-wave";
pub const DEFAULT_FOLDER: &str = "wave";
pub const DEFAULT_STORAGE_ROOT: &str = "storage";
pub const FILTERED_DATA_FILE: &str = "filtered_data.csv";
pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";

/// Export
pub const WORKBOOK_FILE: &str = "filtered_weather_data.xlsx";

/// Environment prefix for configuration overrides (`ECCC__STORAGE__BUCKET`)
pub const CONFIG_ENV_PREFIX: &str = "ECCC";

/// Date formats seen in the `Date/Time` column
pub const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y-%m-%d %H:%M"];
