use anyhow::{Context, Result};
use std::path::PathBuf;

use offtarget::columns::{candidate_columns, is_recognized};
use offtarget::inference::MlpBackend;
use offtarget::pipeline::{ScoringConfig, ScoringPipeline};
use offtarget::table::read_table;

use super::{ensure_exists, ModelArgs};

/// Describe how a table would be scored without launching the bridge
pub fn run(input: PathBuf, model_args: ModelArgs, column: Option<String>) -> Result<()> {
    ensure_exists(&input)?;
    let config = model_args.load_config()?;
    let registry = model_args.discover(&config)?;

    let table =
        read_table(&input).with_context(|| format!("Failed to read {}", input.display()))?;
    let schema = table.schema();

    println!("Table: {}", input.display());
    println!("  Rows: {}", table.num_rows());
    println!("  Columns: {}", schema.fields().len());
    println!();

    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let candidates = candidate_columns(&names);
    println!("SMILES column candidates:");
    if candidates.is_empty() {
        println!("  (none)");
    }
    for name in &candidates {
        println!("  {}", name);
    }
    println!();

    let mut scoring = ScoringConfig::default();
    if let Some(column) = column.or_else(|| config.scoring.smiles_column.clone()) {
        scoring = scoring.with_descriptor_column(column);
    }
    let pipeline = ScoringPipeline::new(MlpBackend, registry, scoring);

    match pipeline.output_schema(&schema) {
        Ok(output) => {
            let resolved = pipeline.descriptor_column(&schema)?;
            let note = if is_recognized(&resolved) { "" } else { " (not a recognized name)" };
            println!("Descriptor column: {}{}", resolved, note);
            println!();
            println!("Output schema:");
            for (i, field) in output.fields().iter().enumerate() {
                let marker = if i >= schema.fields().len() { " +" } else { "" };
                println!("  {:3}. {} ({}){}", i + 1, field.name(), field.data_type(), marker);
            }
        }
        Err(e) => println!("Cannot score this table: {}", e),
    }

    Ok(())
}
