//! # Table I/O
//!
//! Reads and writes molecule tables as Arrow [`RecordBatch`]es. The format is
//! chosen from the file extension:
//!
//! | Extension           | Format                         |
//! |---------------------|--------------------------------|
//! | `.csv`              | comma-separated, header row    |
//! | `.tsv`, `.tab`      | tab-separated, header row      |
//! | `.parquet`, `.pq`   | Apache Parquet                 |
//!
//! Delimited files are read as all-text columns with empty cells as nulls.
//! Parquet keeps whatever types the file declares.

mod delimited;
mod error;
mod parquet_file;

pub use delimited::{read_delimited, write_delimited};
pub use error::TableError;
pub use parquet_file::{read_parquet, write_parquet};

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use arrow::record_batch::RecordBatch;
use log::debug;

/// Supported on-disk table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Apache Parquet
    Parquet,
}

impl TableFormat {
    /// Detect the format from a path's extension (case-insensitive)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("tsv") | Some("tab") => Ok(Self::Tsv),
            Some("parquet") | Some("pq") => Ok(Self::Parquet),
            _ => Err(TableError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Parquet => "parquet",
        }
    }

    fn delimiter(&self) -> Option<u8> {
        match self {
            Self::Csv => Some(b','),
            Self::Tsv => Some(b'\t'),
            Self::Parquet => None,
        }
    }
}

/// Options for writing tables
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// ZSTD compression level for Parquet output (1-22)
    pub compression_level: i32,
    /// Maximum rows per Parquet row group
    pub row_group_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression_level: 3,
            row_group_size: 100_000,
        }
    }
}

/// Read a table, choosing the format from the extension
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<RecordBatch, TableError> {
    let path = path.as_ref();
    let format = TableFormat::from_path(path)?;
    let file = File::open(path)?;

    let batch = match format.delimiter() {
        Some(delimiter) => read_delimited(BufReader::new(file), delimiter)?,
        None => read_parquet(file)?,
    };

    debug!(
        "Read {} rows x {} columns from {}",
        batch.num_rows(),
        batch.num_columns(),
        path.display()
    );
    Ok(batch)
}

/// Write a table, choosing the format from the extension
pub fn write_table<P: AsRef<Path>>(
    path: P,
    batch: &RecordBatch,
    options: &WriteOptions,
) -> Result<(), TableError> {
    let path = path.as_ref();
    let format = TableFormat::from_path(path)?;
    if format == TableFormat::Parquet {
        // Bad options must not leave an empty file behind
        parquet_file::writer_properties(options)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);

    match format.delimiter() {
        Some(delimiter) => write_delimited(&mut writer, batch, delimiter)?,
        None => write_parquet(&mut writer, batch, options)?,
    }
    writer.flush()?;

    debug!("Wrote {} rows to {}", batch.num_rows(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests;
