use std::fmt;

/// Statistics from a completed scoring run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringStats {
    /// Rows in the input table
    pub rows: usize,
    /// Rows that produced a feature vector
    pub featurized: usize,
    /// Rows whose descriptor could not be featurized
    pub failed: usize,
    /// Models whose predictions were written
    pub models_scored: usize,
    /// Models skipped after a failure (only with the skip policy)
    pub models_skipped: usize,
    /// Batched inference calls made
    pub inference_calls: usize,
}

impl fmt::Display for ScoringStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scored {} of {} rows ({} failed featurization) with {} model(s)",
            self.featurized, self.rows, self.failed, self.models_scored
        )?;
        if self.models_skipped > 0 {
            write!(f, ", {} model(s) skipped", self.models_skipped)?;
        }
        Ok(())
    }
}
