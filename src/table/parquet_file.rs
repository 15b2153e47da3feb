use std::io::Write;

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::ChunkReader;

use super::{TableError, WriteOptions};

/// Read every row group of a Parquet file into one batch
pub fn read_parquet<R: ChunkReader + 'static>(reader: R) -> Result<RecordBatch, TableError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
    let schema = builder.schema().clone();
    let batches = builder
        .build()?
        .collect::<Result<Vec<_>, arrow::error::ArrowError>>()?;

    Ok(concat_batches(&schema, &batches)?)
}

/// Write `batch` as a single Parquet file
pub fn write_parquet<W: Write + Send>(
    writer: W,
    batch: &RecordBatch,
    options: &WriteOptions,
) -> Result<(), TableError> {
    let props = writer_properties(options)?;
    let mut arrow_writer = ArrowWriter::try_new(writer, batch.schema(), Some(props))?;
    arrow_writer.write(batch)?;
    arrow_writer.close()?;
    Ok(())
}

/// Parquet writer settings; rejects a ZSTD level outside 1-22
pub(super) fn writer_properties(options: &WriteOptions) -> Result<WriterProperties, TableError> {
    let level = ZstdLevel::try_new(options.compression_level)?;
    Ok(WriterProperties::builder()
        .set_compression(Compression::ZSTD(level))
        .set_max_row_group_size(options.row_group_size)
        .build())
}
