//! Feed-forward classifiers stored as safetensors.
//!
//! An artifact holds one tensor pair per layer, numbered from zero in
//! evaluation order:
//!
//! | Tensor | Shape |
//! |--------|-------|
//! | `layers.{i}.weight` | `[units, inputs]` |
//! | `layers.{i}.bias` | `[units]` |
//!
//! Weights use the `torch.nn.Linear` layout, so a trained PyTorch state dict
//! saves unchanged. Hidden layers apply ReLU. The last layer has a single unit
//! followed by a sigmoid and yields the probability of the active class.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{ops::sigmoid, Linear};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{InferenceBackend, ModelError};
use crate::fingerprint::{FeatureVector, FINGERPRINT_LENGTH};

fn invalid(message: impl Into<String>) -> ModelError {
    ModelError::InvalidArtifact(message.into())
}

/// A stack of linear layers producing one probability per input row
#[derive(Debug, Clone)]
pub struct MlpClassifier {
    layers: Vec<Linear>,
    input_dim: usize,
    device: Device,
}

impl MlpClassifier {
    /// Build a classifier from `(weight, bias)` pairs in evaluation order
    ///
    /// Tensors are converted to `f32` and must share one device.
    pub fn from_layers(layers: Vec<(Tensor, Tensor)>) -> Result<Self, ModelError> {
        let Some((first, _)) = layers.first() else {
            return Err(invalid("network has no layers"));
        };
        let device = first.device().clone();

        let mut linears = Vec::with_capacity(layers.len());
        let mut input_dim = 0;
        let mut inputs: Option<usize> = None;
        for (index, (weight, bias)) in layers.into_iter().enumerate() {
            let (units, width) = weight.dims2().map_err(|_| {
                invalid(format!(
                    "layer {} weight has shape {:?}, expected [units, inputs]",
                    index,
                    weight.dims()
                ))
            })?;
            if units == 0 {
                return Err(invalid(format!("layer {} has no units", index)));
            }
            match inputs {
                None => input_dim = width,
                Some(expected) if expected != width => {
                    return Err(invalid(format!(
                        "layer {} takes {} inputs, previous layer has {} units",
                        index, width, expected
                    )));
                }
                Some(_) => {}
            }
            if bias.dims() != [units] {
                return Err(invalid(format!(
                    "layer {} bias has shape {:?}, expected [{}]",
                    index,
                    bias.dims(),
                    units
                )));
            }
            linears.push(Linear::new(
                weight.to_dtype(DType::F32)?,
                Some(bias.to_dtype(DType::F32)?),
            ));
            inputs = Some(units);
        }

        if inputs != Some(1) {
            return Err(invalid(format!(
                "final layer has {} units, expected a single probability",
                inputs.unwrap_or(0)
            )));
        }

        Ok(Self {
            layers: linears,
            input_dim,
            device,
        })
    }

    /// Read and validate a classifier from a safetensors file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let mut tensors =
            candle_core::safetensors::load(path, &Device::Cpu).map_err(|source| {
                ModelError::Load {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        let mut layers = Vec::new();
        while let Some(weight) = tensors.remove(&format!("layers.{}.weight", layers.len())) {
            let index = layers.len();
            let bias = tensors
                .remove(&format!("layers.{}.bias", index))
                .ok_or_else(|| invalid(format!("layer {} has no bias", index)))?;
            layers.push((weight, bias));
        }
        if let Some(name) = tensors.keys().min() {
            return Err(invalid(format!("unexpected tensor {:?}", name)));
        }

        Self::from_layers(layers)
    }

    /// Write the classifier in the layout [`MlpClassifier::from_file`] reads
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let mut tensors = HashMap::new();
        for (index, layer) in self.layers.iter().enumerate() {
            tensors.insert(format!("layers.{}.weight", index), layer.weight().clone());
            if let Some(bias) = layer.bias() {
                tensors.insert(format!("layers.{}.bias", index), bias.clone());
            }
        }
        candle_core::safetensors::save(&tensors, path)?;
        Ok(())
    }

    /// Number of input features the network was trained on
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Number of layers, output layer included
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Evaluate an `[rows, input_dim]` matrix, returning `[rows, 1]`
    pub fn forward(&self, input: &Tensor) -> Result<Tensor, ModelError> {
        let Some((output, hidden)) = self.layers.split_last() else {
            return Err(invalid("network has no layers"));
        };
        let mut xs = input.clone();
        for layer in hidden {
            xs = layer.forward(&xs)?.relu()?;
        }
        Ok(sigmoid(&output.forward(&xs)?)?)
    }
}

/// Dense `[rows, FINGERPRINT_LENGTH]` input for one batch
fn input_matrix(batch: &[FeatureVector], device: &Device) -> Result<Tensor, ModelError> {
    let mut data = vec![0.0f32; batch.len() * FINGERPRINT_LENGTH];

    #[cfg(feature = "parallel")]
    data.par_chunks_mut(FINGERPRINT_LENGTH)
        .zip(batch.par_iter())
        .for_each(|(row, vector)| vector.write_dense(row));
    #[cfg(not(feature = "parallel"))]
    data.chunks_mut(FINGERPRINT_LENGTH)
        .zip(batch)
        .for_each(|(row, vector)| vector.write_dense(row));

    Ok(Tensor::from_vec(data, (batch.len(), FINGERPRINT_LENGTH), device)?)
}

/// Backend evaluating [`MlpClassifier`] artifacts with candle on the CPU
#[derive(Debug, Clone, Copy, Default)]
pub struct MlpBackend;

impl InferenceBackend for MlpBackend {
    type Model = MlpClassifier;

    fn load(&self, path: &Path) -> Result<MlpClassifier, ModelError> {
        MlpClassifier::from_file(path)
    }

    fn predict(&self, model: &MlpClassifier, batch: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        if model.input_dim != FINGERPRINT_LENGTH {
            return Err(ModelError::InputDimension {
                expected: model.input_dim,
                actual: FINGERPRINT_LENGTH,
            });
        }
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let input = input_matrix(batch, &model.device)?;
        let probabilities = model.forward(&input)?.flatten_all()?.to_vec1::<f32>()?;
        Ok(probabilities.into_iter().map(f64::from).collect())
    }
}
