pub mod pipeline;
pub mod record_cleaner;
pub mod record_joiner;

pub use pipeline::{Pipeline, PipelineDiagnostics, PipelineOutcome, PipelineState};
pub use record_cleaner::{parse_observation_date, CleaningReport, RecordCleaner};
pub use record_joiner::{JoinReport, RecordJoiner};
