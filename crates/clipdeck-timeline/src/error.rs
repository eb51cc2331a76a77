//! Timeline error types.

use clipdeck_models::{ClipId, ShareError, ValidationError};
use thiserror::Error;

pub type TimelineResult<T> = Result<T, TimelineError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Clip not found: {0}")]
    ClipNotFound(ClipId),

    #[error("No clip is selected")]
    NoClipSelected,

    #[error("No clips are checked")]
    NothingChecked,

    #[error("Share link error: {0}")]
    Share(#[from] ShareError),

    #[error("Editor session closed")]
    SessionClosed,
}

impl TimelineError {
    /// Whether the user can fix this by changing their input.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            TimelineError::Validation(_)
                | TimelineError::NoClipSelected
                | TimelineError::NothingChecked
        )
    }

    /// The message to show inline next to the input, if any.
    pub fn user_message(&self) -> Option<String> {
        self.is_user_correctable().then(|| self.to_string())
    }
}
