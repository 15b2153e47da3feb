use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, FieldRef, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use log::{debug, info, warn};

use super::records::{featurize_records, molecule_records, FeatureSet};
use super::{ModelFailurePolicy, ScoringConfig, ScoringError, ScoringStats};
use crate::columns::resolve_column;
use crate::fingerprint::{FeatureVector, Featurizer};
use crate::inference::{InferenceBackend, ModelError};
use crate::registry::{ModelDescriptor, ModelRegistry};

/// Output of a scoring run
#[derive(Debug, Clone)]
pub struct ScoredTable {
    /// Input table with one prediction column per model appended
    pub table: RecordBatch,
    /// Run statistics
    pub stats: ScoringStats,
}

/// Batch scoring pipeline
///
/// Owns the inference backend and the discovered models; the featurizer is
/// borrowed per call so its engine session stays under the caller's control.
#[derive(Debug)]
pub struct ScoringPipeline<B: InferenceBackend> {
    backend: B,
    registry: ModelRegistry,
    config: ScoringConfig,
}

impl<B: InferenceBackend> ScoringPipeline<B> {
    /// Create a pipeline scoring against every model in `registry`
    pub fn new(backend: B, registry: ModelRegistry, config: ScoringConfig) -> Self {
        Self {
            backend,
            registry,
            config,
        }
    }

    /// Models scored by this pipeline
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Run configuration
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Descriptor column that `score` would use for a table with `schema`
    pub fn descriptor_column(&self, schema: &Schema) -> Result<String, ScoringError> {
        let configured = self.config.descriptor_column.as_deref();
        if configured.is_none() {
            debug!("No descriptor column configured, guessing one from column names");
        }

        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        let column = resolve_column(configured, &names)?;
        if schema.index_of(&column).is_err() {
            return Err(ScoringError::MissingColumn(column));
        }
        Ok(column)
    }

    /// Schema of the table `score` would return for an input with `input`
    ///
    /// Checks the same preconditions as `score` without touching any data.
    pub fn output_schema(&self, input: &Schema) -> Result<SchemaRef, ScoringError> {
        self.prepare(input).map(|(_, schema)| schema)
    }

    fn prepare(&self, input: &Schema) -> Result<(String, SchemaRef), ScoringError> {
        let column = self.descriptor_column(input)?;

        if let Some(name) = self
            .registry
            .names()
            .find(|name| input.field_with_name(name).is_ok())
        {
            return Err(ScoringError::DuplicateColumn(name.to_string()));
        }

        let fields: Vec<FieldRef> = input
            .fields()
            .iter()
            .cloned()
            .chain(
                self.registry
                    .names()
                    .map(|name| Arc::new(Field::new(name, DataType::Float64, true))),
            )
            .collect();
        let schema = Schema::new_with_metadata(fields, input.metadata().clone());
        Ok((column, Arc::new(schema)))
    }

    /// Score every row of `table` against every model
    ///
    /// Rows whose descriptor cannot be featurized keep all their input
    /// values and get nulls in every prediction column. Model failures abort
    /// the run unless the skip policy is configured.
    pub fn score<F: Featurizer + ?Sized>(
        &self,
        featurizer: &mut F,
        table: &RecordBatch,
    ) -> Result<ScoredTable, ScoringError> {
        let (column, schema) = self.prepare(table.schema().as_ref())?;
        let num_rows = table.num_rows();
        info!(
            "Scoring {} rows from column '{}' against {} model(s)",
            num_rows,
            column,
            self.registry.len()
        );

        let descriptors = descriptor_strings(table, &column)?;
        let features = featurize_records(featurizer, molecule_records(&descriptors))
            .map_err(ScoringError::EngineUnavailable)?;

        let mut stats = ScoringStats {
            rows: num_rows,
            featurized: features.len(),
            failed: features.failed(),
            ..Default::default()
        };
        if stats.failed > 0 {
            warn!(
                "{} of {} rows could not be featurized and will have no predictions",
                stats.failed, num_rows
            );
        }
        if features.is_empty() && !self.registry.is_empty() {
            warn!("No row could be featurized; skipping inference");
        }

        let mut columns: Vec<ArrayRef> = table.columns().to_vec();
        for model in self.registry.iter() {
            let values = if features.is_empty() {
                None
            } else {
                match self.run_model(&model, features.vectors(), &mut stats) {
                    Ok(values) => {
                        stats.models_scored += 1;
                        Some(values)
                    }
                    Err(source) => match self.config.on_model_error {
                        ModelFailurePolicy::Abort => {
                            return Err(ScoringError::Model {
                                model: model.name,
                                source,
                            })
                        }
                        ModelFailurePolicy::Skip => {
                            warn!("Skipping model '{}': {}", model.name, source);
                            stats.models_skipped += 1;
                            None
                        }
                    },
                }
            };
            columns.push(Arc::new(prediction_column(
                num_rows,
                &features,
                values.as_deref(),
            )));
        }

        let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
        let table = RecordBatch::try_new_with_options(schema, columns, &options)?;

        info!("{}", stats);
        Ok(ScoredTable { table, stats })
    }

    /// Load one model and score the whole batch in a single call
    fn run_model(
        &self,
        model: &ModelDescriptor,
        batch: &[FeatureVector],
        stats: &mut ScoringStats,
    ) -> Result<Vec<f64>, ModelError> {
        debug!("Loading model '{}' from {}", model.name, model.path.display());
        let loaded = self.backend.load(&model.path)?;

        stats.inference_calls += 1;
        let values = self.backend.predict(&loaded, batch)?;
        if values.len() != batch.len() {
            return Err(ModelError::OutputLength {
                expected: batch.len(),
                actual: values.len(),
            });
        }
        Ok(values)
    }
}

/// Descriptor column as UTF-8 strings, casting other types
fn descriptor_strings(table: &RecordBatch, column: &str) -> Result<StringArray, ScoringError> {
    let array = table
        .column_by_name(column)
        .ok_or_else(|| ScoringError::MissingColumn(column.to_string()))?;
    let casted = cast(array, &DataType::Utf8)?;
    casted
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| {
            ScoringError::ArrowError(ArrowError::CastError(format!(
                "column '{}' is not readable as text",
                column
            )))
        })
}

/// Scatter per-vector predictions back to input rows, null elsewhere
fn prediction_column(num_rows: usize, features: &FeatureSet, values: Option<&[f64]>) -> Float64Array {
    let mut column: Vec<Option<f64>> = vec![None; num_rows];
    if let Some(values) = values {
        for (&row, &value) in features.rows().iter().zip(values) {
            column[row] = Some(value);
        }
    }
    Float64Array::from(column)
}
