//! Edit model errors.

use std::path::PathBuf;

use crate::cut::{CutId, CutKind};

/// Errors that can occur when editing a cut list or loading a session.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("Invalid cut range {start:.3}s - {end:.3}s: cuts must satisfy 0 <= start < end <= {duration:.3}s")]
    InvalidRange { start: f64, end: f64, duration: f64 },

    #[error("Invalid media duration: {duration}")]
    InvalidDuration { duration: f64 },

    #[error("Invalid trim window {start:.3}s - {end:.3}s for duration {duration:.3}s")]
    InvalidTrim { start: f64, end: f64, duration: f64 },

    #[error("Cut {id} not found")]
    CutNotFound { id: CutId },

    #[error("Cut {id} is a {kind} cut and can only be disabled, not removed")]
    NotRemovable { id: CutId, kind: CutKind },

    #[error("Duplicate cut id {id}")]
    DuplicateId { id: CutId },

    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl EditError {
    /// Validation failures are surfaced to the user; everything else is an
    /// environment problem.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EditError::InvalidRange { .. }
                | EditError::InvalidTrim { .. }
                | EditError::NotRemovable { .. }
                | EditError::CutNotFound { .. }
        )
    }
}
