use arrow::array::StringArray;
use log::debug;

use crate::fingerprint::{FeatureVector, FeaturizationError, Featurizer};

/// One input row as seen by the featurizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoleculeRecord<'a> {
    /// Row index in the input table
    pub row: usize,
    /// Descriptor text; `None` for null cells
    pub descriptor: Option<&'a str>,
}

/// Records of a descriptor column in row order
pub fn molecule_records(descriptors: &StringArray) -> impl Iterator<Item = MoleculeRecord<'_>> {
    descriptors
        .iter()
        .enumerate()
        .map(|(row, descriptor)| MoleculeRecord { row, descriptor })
}

/// Feature vectors of the rows that featurized successfully
///
/// `rows[i]` is the input row of `vectors[i]`; rows are ascending.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    rows: Vec<usize>,
    vectors: Vec<FeatureVector>,
    failed: usize,
}

impl FeatureSet {
    /// Input rows with a vector
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Vectors, aligned with [`FeatureSet::rows`]
    pub fn vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }

    /// Number of successful rows
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether no row featurized
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Number of rows that failed
    pub fn failed(&self) -> usize {
        self.failed
    }
}

/// Featurize every record, isolating failures to their own row
///
/// The one failure that is not isolated is a lost engine session: every
/// remaining row would fail the same way, so it stops the run.
pub fn featurize_records<'a, F, I>(
    featurizer: &mut F,
    records: I,
) -> Result<FeatureSet, FeaturizationError>
where
    F: Featurizer + ?Sized,
    I: IntoIterator<Item = MoleculeRecord<'a>>,
{
    let mut set = FeatureSet::default();
    for record in records {
        let result = match record.descriptor {
            Some(descriptor) => featurizer.compute(descriptor),
            None => Err(FeaturizationError::MissingDescriptor),
        };
        match result {
            Ok(vector) => {
                set.rows.push(record.row);
                set.vectors.push(vector);
            }
            Err(e) if e.is_session_lost() => return Err(e),
            Err(e) => {
                debug!("Row {}: {}", record.row, e);
                set.failed += 1;
            }
        }
    }
    Ok(set)
}
