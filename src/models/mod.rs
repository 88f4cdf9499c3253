pub mod cleaned;
pub mod merged;
pub mod observation;
pub mod query;
pub mod station;

pub use cleaned::{CleanedRecord, CLEANED_COLUMNS};
pub use merged::MergedRecord;
pub use observation::ObservationRecord;
pub use query::QueryScope;
pub use station::StationRecord;
