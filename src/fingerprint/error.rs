/// Errors raised by a chemistry engine session
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// I/O error talking to the engine process
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The engine rejected the request
    #[error("Engine rejected request: {0}")]
    Rejected(String),

    /// The engine answered with something outside the bridge protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The engine session has already been closed
    #[error("Engine session closed")]
    Closed,
}

/// Errors that prevent a single descriptor from being featurized
///
/// These are always recovered by the scoring pipeline: the affected row
/// receives null predictions and the batch continues.
#[derive(Debug, thiserror::Error)]
pub enum FeaturizationError {
    /// The cell holding the descriptor was null or blank
    #[error("Missing molecule descriptor")]
    MissingDescriptor,

    /// The descriptor could not be parsed into a molecule
    #[error("Failed to parse '{descriptor}': {source}")]
    Parse {
        /// Offending descriptor
        descriptor: String,
        /// Underlying engine failure
        #[source]
        source: EngineError,
    },

    /// The engine failed while fingerprinting a parsed molecule
    #[error("Failed to fingerprint '{descriptor}': {source}")]
    Fingerprint {
        /// Offending descriptor
        descriptor: String,
        /// Underlying engine failure
        #[source]
        source: EngineError,
    },

    /// The engine reported a set bit outside the fingerprint length
    #[error("Fingerprint bit {index} is outside the {length}-bit vector")]
    BitOutOfRange {
        /// Reported bit index
        index: u32,
        /// Fingerprint length
        length: usize,
    },
}

impl FeaturizationError {
    /// Whether the engine session is gone, so no later descriptor can succeed
    pub fn is_session_lost(&self) -> bool {
        matches!(
            self,
            FeaturizationError::Parse {
                source: EngineError::Closed,
                ..
            } | FeaturizationError::Fingerprint {
                source: EngineError::Closed,
                ..
            }
        )
    }
}
