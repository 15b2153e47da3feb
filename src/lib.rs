//! # offtarget - Off-Target Activity Scoring for Molecule Tables
//!
//! `offtarget` takes a table of molecules (one SMILES string per row), turns
//! every molecule into a 1024-bit circular fingerprint, and scores it with a
//! set of pretrained binary classifiers, one per off-target (hERG, 5-HT2B,
//! ...). The result is the input table with one probability column per model.
//!
//! ## Key Features
//!
//! - **Row failure isolation**: a molecule that cannot be parsed gets nulls in
//!   every prediction column; the rest of the table is still scored. A lost
//!   engine session aborts the run instead.
//!
//! - **Batched inference**: each model is loaded once and scores all valid
//!   rows in a single call.
//!
//! - **Pluggable chemistry**: fingerprints come from any [`ChemistryEngine`],
//!   such as an external toolkit process driven over a line protocol
//!   ([`ProcessBridge`]).
//!
//! - **Columnar tables**: CSV, TSV and Parquet are read into Arrow
//!   [`RecordBatch`]es and written back in the same shape.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use offtarget::prelude::*;
//!
//! let registry = ModelRegistry::discover("models")?;
//! let pipeline = ScoringPipeline::new(MlpBackend, registry, ScoringConfig::default());
//!
//! let table = read_table("library.csv")?;
//! let bridge = ProcessBridge::launch(&BridgeConfig::new("ecfp4-bridge"))?;
//! let mut adapter = FingerprintAdapter::new(bridge);
//!
//! let scored = pipeline.score(&mut adapter, &table)?;
//! adapter.close()?;
//!
//! write_table("library.scored.parquet", &scored.table, &WriteOptions::default())?;
//! println!("{}", scored.stats);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`fingerprint`]: feature vectors, the engine seam and the process bridge
//! - [`registry`]: discovery of model artifacts in a directory
//! - [`columns`]: choosing the SMILES column of a table
//! - [`inference`]: the inference backend seam and the candle MLP backend
//! - [`pipeline`]: batch scoring with per-row failure isolation
//! - [`table`]: CSV/TSV/Parquet table I/O
//!
//! [`ChemistryEngine`]: fingerprint::ChemistryEngine
//! [`ProcessBridge`]: fingerprint::ProcessBridge
//! [`RecordBatch`]: arrow::record_batch::RecordBatch

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod columns;
pub mod fingerprint;
pub mod inference;
pub mod pipeline;
pub mod registry;
pub mod table;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::columns::{candidate_columns, resolve_column, ColumnResolutionError};
    pub use crate::fingerprint::{
        BridgeConfig, ChemistryEngine, EngineError, FeatureVector, FeaturizationError,
        Featurizer, FingerprintAdapter, ProcessBridge, FINGERPRINT_LENGTH,
    };
    pub use crate::inference::{InferenceBackend, MlpBackend, MlpClassifier, ModelError};
    pub use crate::pipeline::{
        ModelFailurePolicy, ScoredTable, ScoringConfig, ScoringError, ScoringPipeline,
        ScoringStats,
    };
    pub use crate::registry::{ModelRegistry, RegistryError};
    pub use crate::table::{read_table, write_table, TableError, TableFormat, WriteOptions};
}
