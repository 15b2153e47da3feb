use super::*;
use arrow::array::{Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use std::sync::Arc;
use tempfile::tempdir;

fn sample_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, true),
        Field::new("herg", DataType::Float64, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec![Some("a"), Some("b"), None])),
            Arc::new(Float64Array::from(vec![Some(0.25), None, Some(0.75)])),
        ],
    )
    .unwrap()
}

#[test]
fn test_format_from_path() {
    assert_eq!(TableFormat::from_path("mols.CSV").unwrap(), TableFormat::Csv);
    assert_eq!(TableFormat::from_path("mols.tab").unwrap(), TableFormat::Tsv);
    assert_eq!(TableFormat::from_path("a/b.pq").unwrap(), TableFormat::Parquet);
    assert!(matches!(
        TableFormat::from_path("mols.xlsx"),
        Err(TableError::UnsupportedFormat(_))
    ));
    assert!(TableFormat::from_path("no_extension").is_err());
}

#[test]
fn test_read_csv_nulls_and_text() {
    let data = "id,SMILES,value\n1,CCO,0.5\n2,,\n3,c1ccccc1,007\n";
    let batch = read_delimited(data.as_bytes(), b',').unwrap();

    assert_eq!(batch.num_rows(), 3);
    assert_eq!(batch.num_columns(), 3);
    assert!(batch
        .schema()
        .fields()
        .iter()
        .all(|f| f.data_type() == &DataType::Utf8 && f.is_nullable()));

    let smiles = batch
        .column(1)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(smiles.value(0), "CCO");
    assert!(smiles.is_null(1));

    // Values are not reinterpreted as numbers
    let value = batch
        .column(2)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(value.value(2), "007");
}

#[test]
fn test_read_header_only() {
    let batch = read_delimited("smiles\tid\n".as_bytes(), b'\t').unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.schema().field(1).name(), "id");
}

#[test]
fn test_read_ragged_rows_fails() {
    let data = "a,b\n1,2\n3\n";
    assert!(matches!(
        read_delimited(data.as_bytes(), b','),
        Err(TableError::CsvError(_))
    ));
}

#[test]
fn test_write_csv_nulls_as_empty() {
    let mut out = Vec::new();
    write_delimited(&mut out, &sample_batch(), b',').unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, "id,herg\na,0.25\nb,\n,0.75\n");
}

#[test]
fn test_csv_file_roundtrip_keeps_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scored.csv");
    write_table(&path, &sample_batch(), &WriteOptions::default()).unwrap();

    let back = read_table(&path).unwrap();
    assert_eq!(back.num_rows(), 3);
    let herg = back
        .column(1)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(herg.value(0), "0.25");
    assert!(herg.is_null(1));
}

#[test]
fn test_parquet_file_roundtrip_keeps_types() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scored.parquet");
    let batch = sample_batch();
    write_table(&path, &batch, &WriteOptions::default()).unwrap();

    let back = read_table(&path).unwrap();
    assert_eq!(back.schema().field(1).data_type(), &DataType::Float64);
    assert_eq!(back.num_rows(), batch.num_rows());
    assert_eq!(back.columns(), batch.columns());
}

#[test]
fn test_invalid_compression_level_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scored.parquet");
    let options = WriteOptions {
        compression_level: 40,
        ..Default::default()
    };

    assert!(matches!(
        write_table(&path, &sample_batch(), &options),
        Err(TableError::ParquetError(_))
    ));
    assert!(!path.exists());

    let mut out = Vec::new();
    assert!(write_parquet(&mut out, &sample_batch(), &options).is_err());
}

#[test]
fn test_headers_and_cells_kept_verbatim() {
    let data = " SMILES ,id\n CCO ,1\n";
    let batch = read_delimited(data.as_bytes(), b',').unwrap();
    assert_eq!(batch.schema().field(0).name(), " SMILES ");

    let smiles = batch
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(smiles.value(0), " CCO ");
}
