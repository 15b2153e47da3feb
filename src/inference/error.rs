use std::path::PathBuf;

/// Errors raised while loading a model artifact or running inference
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The artifact could not be read or is not a safetensors file
    #[error("Failed to load model artifact {}: {source}", .path.display())]
    Load {
        /// Artifact path
        path: PathBuf,
        /// Underlying read or decode failure
        #[source]
        source: candle_core::Error,
    },

    /// The artifact decoded but describes an unusable network
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// The model expects a different number of input features
    #[error("Model expects {expected} input features, fingerprints have {actual}")]
    InputDimension {
        /// Features the model was built for
        expected: usize,
        /// Features supplied
        actual: usize,
    },

    /// Inference produced a different number of values than rows submitted
    #[error("Model produced {actual} values for {expected} rows")]
    OutputLength {
        /// Rows in the batch
        expected: usize,
        /// Values returned
        actual: usize,
    },

    /// A tensor operation failed during conversion or inference
    #[error("Tensor operation failed: {0}")]
    Tensor(#[from] candle_core::Error),
}
