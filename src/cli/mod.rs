use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

use offtarget::registry::{ModelRegistry, DEFAULT_ARTIFACT_EXTENSION};

mod config;
mod inspect;
mod models;
mod score;

pub use config::Config;

/// Directory scanned for models when neither flag nor config names one
const DEFAULT_MODEL_DIR: &str = "models";

/// offtarget - score molecule tables against off-target activity models
#[derive(Parser)]
#[command(name = "offtarget")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that needs the model set.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Directory containing model artifacts (default: ./models)
    #[arg(short = 'm', long, value_name = "DIR")]
    models: Option<PathBuf>,

    /// Artifact file extension (default: safetensors)
    #[arg(long, value_name = "EXT")]
    extension: Option<String>,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl ModelArgs {
    fn load_config(&self) -> Result<Config> {
        Config::load(self.config.as_deref())
    }

    fn discover(&self, config: &Config) -> Result<ModelRegistry> {
        let dir = self
            .models
            .clone()
            .or_else(|| config.models.directory.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR));
        let extension = self
            .extension
            .as_deref()
            .or(config.models.extension.as_deref())
            .unwrap_or(DEFAULT_ARTIFACT_EXTENSION);

        info!("Model directory: {}", dir.display());
        ModelRegistry::discover_with_extension(&dir, extension)
            .with_context(|| format!("Failed to discover models in {}", dir.display()))
    }
}

/// Arguments of the `score` command.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Input table (.csv, .tsv or .parquet)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output table (defaults to <INPUT stem>.scored.<ext>)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    model_args: ModelArgs,

    /// Column holding SMILES (guessed from column names when omitted)
    #[arg(short = 's', long, value_name = "NAME")]
    column: Option<String>,

    /// Chemistry bridge executable
    #[arg(long, value_name = "CMD")]
    bridge: Option<String>,

    /// Argument passed to the bridge executable (repeatable)
    #[arg(long = "bridge-arg", value_name = "ARG", allow_hyphen_values = true)]
    bridge_args: Vec<String>,

    /// Emit an empty column for a failing model instead of aborting
    #[arg(long)]
    skip_failed_models: bool,

    /// Compression level for ZSTD Parquet output (1-22, default: 3)
    #[arg(short = 'c', long, hide = true)]
    compression_level: Option<i32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Append one prediction column per model to a molecule table
    Score(ScoreArgs),

    /// Show candidate SMILES columns and the schema a score run would produce
    Inspect {
        /// Input table (.csv, .tsv or .parquet)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        model_args: ModelArgs,

        /// Column holding SMILES (guessed from column names when omitted)
        #[arg(short = 's', long, value_name = "NAME")]
        column: Option<String>,
    },

    /// List the models that would be scored
    Models {
        #[command(flatten)]
        model_args: ModelArgs,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Score(args) => score::run(args),
        Commands::Inspect {
            input,
            model_args,
            column,
        } => inspect::run(input, model_args, column),
        Commands::Models { model_args } => models::run(model_args),
    }
}

/// Fail early with a readable message when an input file is missing
fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Input file does not exist: {}", path.display());
    }
    Ok(())
}
