use serde::Deserialize;

/// What to do when a model cannot be loaded or fails during inference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFailurePolicy {
    /// Abort the whole scoring run (default)
    #[default]
    Abort,
    /// Log a warning and emit an all-null column for the failing model
    Skip,
}

/// Configuration for a scoring run
#[derive(Debug, Clone, Default)]
pub struct ScoringConfig {
    /// Column holding molecule descriptors; guessed from column names when `None`
    pub descriptor_column: Option<String>,

    /// Handling of model load/inference failures
    pub on_model_error: ModelFailurePolicy,
}

impl ScoringConfig {
    /// Use `column` as the descriptor column instead of guessing
    pub fn with_descriptor_column(mut self, column: impl Into<String>) -> Self {
        self.descriptor_column = Some(column.into());
        self
    }

    /// Set the model failure policy
    pub fn with_model_failure_policy(mut self, policy: ModelFailurePolicy) -> Self {
        self.on_model_error = policy;
        self
    }
}
