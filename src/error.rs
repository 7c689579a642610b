use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictationError {
    #[error("Speech recognition is not supported in this environment")]
    UnsupportedCapability,

    #[error("Failed to start voice recognition: {reason}")]
    StartFailure { reason: String },

    #[error("Speech recognition error: {reason}")]
    Recognition { reason: String },
}

impl DictationError {
    pub fn start_failure(reason: impl Into<String>) -> Self {
        Self::StartFailure {
            reason: reason.into(),
        }
    }

    pub fn recognition(reason: impl Into<String>) -> Self {
        Self::Recognition {
            reason: reason.into(),
        }
    }
}
