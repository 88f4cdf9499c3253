pub mod blob_store;
pub mod csv_writer;
pub mod workbook_writer;

pub use blob_store::{BlobStore, FsBlobStore, MemoryBlobStore, StorageCredentials};
pub use csv_writer::CsvWriter;
pub use workbook_writer::WorkbookWriter;
