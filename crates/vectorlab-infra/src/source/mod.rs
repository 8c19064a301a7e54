//! Record sources for ingestion.

pub mod csv;

pub use self::csv::CsvRecordSource;
