//! # offtarget
//!
//! A command-line tool for scoring molecule tables against off-target
//! activity models.
//!
//! ## Usage
//!
//! ```bash
//! # Score a CSV with every model in ./models
//! offtarget score library.csv --bridge ecfp4-bridge
//!
//! # Check which column would be used and what gets appended
//! offtarget inspect library.parquet --models /opt/models
//!
//! # List discovered models
//! offtarget models --models /opt/models
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
