use super::{EngineError, FeatureVector, FeaturizationError};

/// A chemistry toolkit session able to parse and fingerprint molecules
///
/// Implementations hold whatever long-lived state the toolkit needs (a
/// child process, a native handle). Methods take `&mut self` because a
/// session has a single owner; callers that want to share one across
/// threads must wrap it in a lock themselves.
pub trait ChemistryEngine {
    /// Engine-side handle to a parsed molecule
    type Molecule;

    /// Parse a molecule descriptor (typically SMILES)
    fn parse(&mut self, descriptor: &str) -> Result<Self::Molecule, EngineError>;

    /// Set-bit indices of the circular fingerprint of a parsed molecule
    fn fingerprint(&mut self, molecule: &Self::Molecule) -> Result<Vec<u32>, EngineError>;

    /// End the session. The default does nothing.
    fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Anything that turns a descriptor into a [`FeatureVector`]
///
/// This is the seam the scoring pipeline depends on, so tests can
/// substitute a deterministic featurizer for a real engine.
pub trait Featurizer {
    /// Compute the feature vector of one descriptor
    fn compute(&mut self, descriptor: &str) -> Result<FeatureVector, FeaturizationError>;
}

impl<F: Featurizer + ?Sized> Featurizer for &mut F {
    fn compute(&mut self, descriptor: &str) -> Result<FeatureVector, FeaturizationError> {
        (**self).compute(descriptor)
    }
}

/// Counters accumulated by a [`FingerprintAdapter`] over its lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeaturizerStats {
    /// Number of `compute` calls
    pub computed: usize,
    /// Number of calls that returned an error
    pub failed: usize,
}

/// Fingerprint adapter over an owned [`ChemistryEngine`] session
///
/// The caller constructs the engine, hands it to the adapter, and ends the
/// session with [`FingerprintAdapter::close`].
#[derive(Debug)]
pub struct FingerprintAdapter<E: ChemistryEngine> {
    engine: E,
    stats: FeaturizerStats,
}

impl<E: ChemistryEngine> FingerprintAdapter<E> {
    /// Wrap an open engine session
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            stats: FeaturizerStats::default(),
        }
    }

    /// Counters since construction
    pub fn stats(&self) -> FeaturizerStats {
        self.stats
    }

    /// Borrow the underlying engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Close the engine session and return the final counters
    pub fn close(mut self) -> Result<FeaturizerStats, EngineError> {
        self.engine.close()?;
        Ok(self.stats)
    }

    fn featurize(&mut self, descriptor: &str) -> Result<FeatureVector, FeaturizationError> {
        if descriptor.trim().is_empty() {
            return Err(FeaturizationError::MissingDescriptor);
        }

        let molecule =
            self.engine
                .parse(descriptor)
                .map_err(|source| FeaturizationError::Parse {
                    descriptor: descriptor.to_string(),
                    source,
                })?;

        let bits = self
            .engine
            .fingerprint(&molecule)
            .map_err(|source| FeaturizationError::Fingerprint {
                descriptor: descriptor.to_string(),
                source,
            })?;

        FeatureVector::from_set_bits(bits)
    }
}

impl<E: ChemistryEngine> Featurizer for FingerprintAdapter<E> {
    fn compute(&mut self, descriptor: &str) -> Result<FeatureVector, FeaturizationError> {
        self.stats.computed += 1;
        let result = self.featurize(descriptor);
        if result.is_err() {
            self.stats.failed += 1;
        }
        result
    }
}
