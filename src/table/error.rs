use std::path::PathBuf;

/// Errors that can occur while reading or writing tables
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing or writing error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from the Arrow library during array operations
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Error from the Parquet library
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// File extension does not map to a known table format
    #[error("Unsupported table format: {} (expected .csv, .tsv or .parquet)", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The file parsed but is not a usable table
    #[error("Invalid table: {0}")]
    InvalidFormat(String),
}
