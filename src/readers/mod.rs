pub mod cleaned_reader;
pub mod observation_reader;
pub mod station_reader;

pub use cleaned_reader::read_cleaned_records;
pub use observation_reader::ObservationReader;
pub use station_reader::{StationDirectory, StationReader};
