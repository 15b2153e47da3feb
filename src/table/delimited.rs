use std::io::{Read, Write};
use std::sync::Arc;

use arrow::array::{ArrayRef, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};

use super::TableError;

/// Read a delimited table with a header row
///
/// Every column becomes a nullable Utf8 column and empty cells become
/// nulls, so values are carried through to the output byte-for-byte.
pub fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<RecordBatch, TableError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(TableError::InvalidFormat(
            "missing header row".to_string(),
        ));
    }

    let mut builders: Vec<StringBuilder> = headers.iter().map(|_| StringBuilder::new()).collect();
    for record in csv_reader.records() {
        let record = record?;
        for (builder, value) in builders.iter_mut().zip(record.iter()) {
            if value.is_empty() {
                builder.append_null();
            } else {
                builder.append_value(value);
            }
        }
    }

    let fields: Vec<Field> = headers
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();
    let columns: Vec<ArrayRef> = builders
        .into_iter()
        .map(|mut builder| Arc::new(builder.finish()) as ArrayRef)
        .collect();

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Write `batch` as a delimited table with a header row
///
/// Nulls are written as empty cells; other values use Arrow's display
/// formatting.
pub fn write_delimited<W: Write>(
    writer: W,
    batch: &RecordBatch,
    delimiter: u8,
) -> Result<(), TableError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    let schema = batch.schema();
    csv_writer.write_record(schema.fields().iter().map(|f| f.name().as_str()))?;

    let options = FormatOptions::default();
    let formatters = batch
        .columns()
        .iter()
        .map(|column| ArrayFormatter::try_new(column.as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut record = Vec::with_capacity(formatters.len());
    for row in 0..batch.num_rows() {
        record.clear();
        record.extend(formatters.iter().map(|f| f.value(row).to_string()));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}
