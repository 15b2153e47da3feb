//! # Inference Backends
//!
//! A backend loads a trained model artifact and scores a batch of
//! [`FeatureVector`]s in one call, returning one probability per row.
//!
//! [`MlpBackend`] runs feed-forward classifiers stored as safetensors on
//! candle, scoring a whole batch in one forward pass. Other runtimes plug in
//! by implementing [`InferenceBackend`].

mod error;
mod mlp;

pub use mlp::{MlpBackend, MlpClassifier};
pub use error::ModelError;

use std::path::Path;

use crate::fingerprint::FeatureVector;

/// Model loading and batched inference
pub trait InferenceBackend {
    /// Loaded, ready-to-run model
    type Model;

    /// Load the artifact at `path`
    fn load(&self, path: &Path) -> Result<Self::Model, ModelError>;

    /// Score every vector in `batch`
    ///
    /// Implementations return the model's flattened output; a well-formed
    /// single-output classifier yields exactly `batch.len()` values. Values
    /// are passed through unclamped.
    fn predict(&self, model: &Self::Model, batch: &[FeatureVector]) -> Result<Vec<f64>, ModelError>;
}

impl<B: InferenceBackend + ?Sized> InferenceBackend for &B {
    type Model = B::Model;

    fn load(&self, path: &Path) -> Result<Self::Model, ModelError> {
        (**self).load(path)
    }

    fn predict(&self, model: &Self::Model, batch: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        (**self).predict(model, batch)
    }
}
