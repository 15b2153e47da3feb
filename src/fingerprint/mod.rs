//! # Fingerprint Adapter
//!
//! Turns a molecule descriptor (SMILES) into a fixed-length binary
//! [`FeatureVector`] by asking a [`ChemistryEngine`] for the set bits of the
//! molecule's circular fingerprint.
//!
//! ## Design Principles
//!
//! 1. **Owned sessions**: the engine session is constructed by the caller,
//!    moved into a [`FingerprintAdapter`] and closed explicitly. There is no
//!    process-wide engine.
//!
//! 2. **Narrow failures**: every way a single descriptor can fail is a
//!    [`FeaturizationError`]. The scoring pipeline recovers from exactly that
//!    type and nothing else.
//!
//! 3. **Strict length**: set bits outside [`FINGERPRINT_LENGTH`] are an error
//!    rather than being dropped or folded.

mod adapter;
pub mod bridge;
mod error;
mod vector;

#[cfg(test)]
mod tests;

pub use adapter::{ChemistryEngine, Featurizer, FeaturizerStats, FingerprintAdapter};
pub use bridge::{BridgeConfig, BridgeMolecule, LineProtocol, ProcessBridge};
pub use error::{EngineError, FeaturizationError};
pub use vector::{FeatureVector, FINGERPRINT_LENGTH};
