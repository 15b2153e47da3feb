//! # Column Resolver
//!
//! Decides which input column holds the molecule descriptors: either the
//! configured column, or the single column whose name is a recognized
//! descriptor name (case-insensitive).

/// Column names recognized as holding molecule descriptors (lowercase)
pub const RECOGNIZED_COLUMN_NAMES: [&str; 10] = [
    "smiles",
    "molecules",
    "structures",
    "mols",
    "smi",
    "canonical_smiles",
    "canonisized_smiles",
    "canon_smiles",
    "can_smiles",
    "can_smi",
];

/// No unique descriptor column could be guessed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Expected exactly one molecule column, found {}: {candidates:?}. \
     Configure the descriptor column explicitly.",
    .candidates.len()
)]
pub struct ColumnResolutionError {
    /// Matching columns in input order (empty when none matched)
    pub candidates: Vec<String>,
}

/// Whether `name` is a recognized descriptor column name
pub fn is_recognized(name: &str) -> bool {
    let lower = name.to_lowercase();
    RECOGNIZED_COLUMN_NAMES.contains(&lower.as_str())
}

/// Columns of `available` with a recognized descriptor name, in input order
pub fn candidate_columns<S: AsRef<str>>(available: &[S]) -> Vec<String> {
    available
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| is_recognized(name))
        .map(str::to_string)
        .collect()
}

/// Resolve the descriptor column
///
/// A configured name is returned as-is without checking it against
/// `available`. Otherwise exactly one recognized column must exist.
pub fn resolve_column<S: AsRef<str>>(
    configured: Option<&str>,
    available: &[S],
) -> Result<String, ColumnResolutionError> {
    if let Some(name) = configured {
        return Ok(name.to_string());
    }

    let mut candidates = candidate_columns(available);
    if candidates.len() == 1 {
        Ok(candidates.remove(0))
    } else {
        Err(ColumnResolutionError { candidates })
    }
}
