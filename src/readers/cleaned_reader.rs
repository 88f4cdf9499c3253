use crate::error::Result;
use crate::models::CleanedRecord;
use crate::utils::encoding::decode_csv_bytes;

/// Read back a persisted cleaned CSV blob
pub fn read_cleaned_records(bytes: &[u8]) -> Result<Vec<CleanedRecord>> {
    let text = decode_csv_bytes(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: CleanedRecord = row?;
        records.push(record);
    }

    Ok(records)
}
