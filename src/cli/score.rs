use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use offtarget::fingerprint::{FingerprintAdapter, ProcessBridge};
use offtarget::inference::MlpBackend;
use offtarget::pipeline::{ModelFailurePolicy, ScoringConfig, ScoringPipeline, ScoringStats};
use offtarget::table::{read_table, write_table, TableFormat, WriteOptions};

use super::{ensure_exists, ScoreArgs};

/// Score a molecule table against every discovered model
pub fn run(args: ScoreArgs) -> Result<()> {
    ensure_exists(&args.input)?;
    let config = args.model_args.load_config()?;

    let output = match args.output {
        Some(output) => output,
        None => default_output_path(&args.input)?,
    };
    // Reject an unwritable format before doing any work
    TableFormat::from_path(&output)?;

    let registry = args.model_args.discover(&config)?;
    info!("Models: {}", registry.names().collect::<Vec<_>>().join(", "));

    let mut scoring = ScoringConfig::default();
    if let Some(column) = args.column.or_else(|| config.scoring.smiles_column.clone()) {
        scoring = scoring.with_descriptor_column(column);
    }
    let policy = if args.skip_failed_models {
        ModelFailurePolicy::Skip
    } else {
        config.scoring.on_model_error.unwrap_or_default()
    };
    scoring = scoring.with_model_failure_policy(policy);

    let pipeline = ScoringPipeline::new(MlpBackend, registry, scoring);

    let table = read_table(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    // Resolve the column before paying for a bridge launch
    pipeline.output_schema(table.schema().as_ref())?;

    let mut write_options = WriteOptions::default();
    if let Some(level) = args
        .compression_level
        .or(config.scoring.compression_level)
    {
        write_options.compression_level = level;
    }

    let start = Instant::now();
    if pipeline.registry().is_empty() {
        warn!("No models found; writing the input unchanged");
        write_table(&output, &table, &write_options)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        let stats = ScoringStats {
            rows: table.num_rows(),
            ..Default::default()
        };
        print_summary(&stats, &output, start.elapsed().as_secs_f64());
        return Ok(());
    }

    let bridge = config
        .bridge_config(args.bridge.as_deref(), &args.bridge_args)
        .context("No chemistry bridge configured; pass --bridge or set [bridge] command")?;

    let engine = ProcessBridge::launch(&bridge)
        .with_context(|| format!("Failed to launch bridge {:?}", bridge.command))?;
    info!("Chemistry bridge running as pid {}", engine.id());
    let mut adapter = FingerprintAdapter::new(engine);

    let scored = pipeline.score(&mut adapter, &table);
    let featurizer_stats = adapter.close().context("Failed to close chemistry bridge")?;
    let scored = scored?;
    info!(
        "Featurizer: {} computed, {} failed",
        featurizer_stats.computed, featurizer_stats.failed
    );

    write_table(&output, &scored.table, &write_options)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_summary(&scored.stats, &output, start.elapsed().as_secs_f64());
    Ok(())
}

/// `<dir>/<stem>.scored.<ext>` next to the input
fn default_output_path(input: &Path) -> Result<PathBuf> {
    let format = TableFormat::from_path(input)?;
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .context("Input path has no file name")?;
    Ok(input.with_file_name(format!("{}.scored.{}", stem, format.extension())))
}

fn print_summary(stats: &ScoringStats, output: &Path, elapsed: f64) {
    #[cfg(feature = "colorized_output")]
    {
        use console::style;

        println!("{}", style("Scoring complete").bold().green());
        println!("  {}: {}", style("Output").bold(), output.display());
        println!(
            "  {}: {} of {} featurized",
            style("Rows").bold(),
            style(stats.featurized).green(),
            stats.rows
        );
        if stats.failed > 0 {
            println!(
                "  {}: {}",
                style("Failed rows").bold(),
                style(stats.failed).yellow()
            );
        }
        println!("  {}: {}", style("Models").bold(), stats.models_scored);
        if stats.models_skipped > 0 {
            println!(
                "  {}: {}",
                style("Skipped models").bold(),
                style(stats.models_skipped).red()
            );
        }
        println!("  {}: {:.2}s", style("Time").bold(), elapsed);
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", stats);
        println!("Output: {}", output.display());
        println!("Time: {:.2}s", elapsed);
    }
}
