use crate::error::{ProcessingError, Result};
use crate::models::CleanedRecord;
use crate::writers::BlobStore;
use tracing::info;

pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize records with a header row. An empty set still gets the header.
    pub fn to_bytes(&self, records: &[CleanedRecord]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(crate::models::CLEANED_COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }

        writer
            .into_inner()
            .map_err(|e| ProcessingError::Io(e.into_error()))
    }

    /// Write records to `key`, replacing any previous object
    pub fn write_csv<B: BlobStore + ?Sized>(
        &self,
        store: &B,
        records: &[CleanedRecord],
        key: &str,
    ) -> Result<()> {
        let body = self.to_bytes(records)?;
        let bytes = body.len();
        store.put_object(key, body)?;

        info!(
            "Wrote {} records ({} bytes) to {}",
            records.len(),
            bytes,
            store.describe(key)
        );
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}
