pub mod constants;
pub mod encoding;
pub mod filename;
pub mod identifiers;
pub mod logging;
pub mod progress;

pub use constants::*;
pub use encoding::{decode_csv_bytes, skip_lines};
pub use filename::filtered_data_key;
pub use identifiers::normalize_climate_id;
pub use logging::init_tracing;
pub use progress::ProgressReporter;
