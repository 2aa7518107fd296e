//! Error types for inline AI diff review

use thiserror::Error;

use crate::types::Hunk;

/// Errors raised while reviewing AI-suggested edits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiDiffError {
    /// A hunk action referenced a hunk that is no longer part of the current
    /// diff (the text changed between render and click).
    #[error("Hunk {0} is no longer present in the current diff")]
    StaleHunkReference(Hunk),

    /// The host editor has no live model to read from or write to.
    #[error("No live editor model")]
    MissingModel,

    /// A splice would read or write outside the text. This points at a
    /// classification bug and must never be swallowed.
    #[error("Malformed splice for hunk {hunk}: {reason}")]
    MalformedSplice { hunk: Hunk, reason: String },
}

impl AiDiffError {
    pub(crate) fn malformed(hunk: Hunk, reason: impl Into<String>) -> Self {
        Self::MalformedSplice {
            hunk,
            reason: reason.into(),
        }
    }

    /// Whether the surface should treat this error as a silent no-op.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::StaleHunkReference(_) | Self::MissingModel)
    }
}

/// Result type alias for inline diff operations
pub type Result<T> = std::result::Result<T, AiDiffError>;
