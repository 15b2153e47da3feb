use crate::columns::ColumnResolutionError;
use crate::fingerprint::FeaturizationError;
use crate::inference::ModelError;

/// Errors that abort a scoring run
///
/// Per-row featurization failures never appear here; they only leave null
/// predictions behind.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// No unique descriptor column could be determined
    #[error(transparent)]
    ColumnResolution(#[from] ColumnResolutionError),

    /// The configured descriptor column is not in the table
    #[error("Column not found: {0}")]
    MissingColumn(String),

    /// A model name collides with an existing input column
    #[error("Model '{0}' would overwrite an existing column of the same name")]
    DuplicateColumn(String),

    /// The chemistry engine session ended partway through the table
    #[error("Chemistry engine unavailable: {0}")]
    EngineUnavailable(#[source] FeaturizationError),

    /// A model failed to load or to run
    #[error("Model '{model}' failed: {source}")]
    Model {
        /// Name of the failing model
        model: String,
        /// Underlying failure
        #[source]
        source: ModelError,
    },

    /// Error from the Arrow library while assembling the output
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),
}
