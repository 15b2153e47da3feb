//! # Batch Scoring Pipeline
//!
//! Glues molecule descriptors to per-model probabilities:
//!
//! 1. **Resolve** the descriptor column (configured or guessed).
//! 2. **Featurize** every row. A row that fails is isolated: it keeps its
//!    input values and gets nulls in every prediction column.
//! 3. **Infer** once per model over the stacked vectors of all successful
//!    rows. With no successful rows no model is loaded at all.
//! 4. **Merge** one nullable `Float64` column per model, named after the
//!    model, onto the input table.
//!
//! Row count and order of the output always equal the input's.

mod config;
mod error;
mod records;
mod scorer;
mod stats;


pub use config::{ModelFailurePolicy, ScoringConfig};
pub use error::ScoringError;
pub use records::{featurize_records, molecule_records, FeatureSet, MoleculeRecord};
pub use scorer::{ScoredTable, ScoringPipeline};
pub use stats::ScoringStats;
