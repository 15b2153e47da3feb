use std::fmt;

use super::FeaturizationError;

/// Number of positions in every fingerprint vector
pub const FINGERPRINT_LENGTH: usize = 1024;

const WORDS: usize = FINGERPRINT_LENGTH / 64;

/// Fixed-length binary feature vector derived from one molecule
///
/// Packed into 64-bit words; position `i` is set when the fingerprinting
/// algorithm reported `i` as a set bit.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FeatureVector {
    words: [u64; WORDS],
}

impl FeatureVector {
    /// All-zero vector
    pub fn zeros() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Build a vector from the set-bit indices reported by an engine
    ///
    /// Duplicated indices are harmless. Any index at or beyond
    /// [`FINGERPRINT_LENGTH`] rejects the whole vector.
    pub fn from_set_bits<I>(indices: I) -> Result<Self, FeaturizationError>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut vector = Self::zeros();
        for index in indices {
            let position = index as usize;
            if position >= FINGERPRINT_LENGTH {
                return Err(FeaturizationError::BitOutOfRange {
                    index,
                    length: FINGERPRINT_LENGTH,
                });
            }
            vector.words[position / 64] |= 1u64 << (position % 64);
        }
        Ok(vector)
    }

    /// Vector length (always [`FINGERPRINT_LENGTH`])
    #[inline]
    pub fn len(&self) -> usize {
        FINGERPRINT_LENGTH
    }

    /// Always false; present for API symmetry with `len`
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether position `index` is set. Out-of-range positions read as unset.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        index < FINGERPRINT_LENGTH && self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    /// Number of set positions
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate set positions in ascending order
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut remaining = word;
            std::iter::from_fn(move || {
                if remaining == 0 {
                    return None;
                }
                let bit = remaining.trailing_zeros() as usize;
                remaining &= remaining - 1;
                Some(w * 64 + bit)
            })
        })
    }

    /// Dense 0.0/1.0 copy of the vector
    pub fn to_dense(&self) -> Vec<f32> {
        let mut dense = vec![0.0f32; FINGERPRINT_LENGTH];
        self.write_dense(&mut dense);
        dense
    }

    /// Write set positions as 1.0 into a zeroed row of at least
    /// [`FINGERPRINT_LENGTH`] values
    pub fn write_dense(&self, row: &mut [f32]) {
        for position in self.iter_ones() {
            if let Some(value) = row.get_mut(position) {
                *value = 1.0;
            }
        }
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::zeros()
    }
}

impl fmt::Debug for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureVector")
            .field("set_bits", &self.iter_ones().collect::<Vec<_>>())
            .finish()
    }
}
