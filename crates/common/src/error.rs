//! Error types shared across Keepcut crates.

use std::path::PathBuf;

/// Top-level error type for Keepcut operations.
#[derive(Debug, thiserror::Error)]
pub enum KeepcutError {
    #[error("Media engine failure: {message}")]
    MediaEngine { message: String },

    #[error("An export is already in progress")]
    ExportBusy,

    #[error("Analysis unavailable: {message}")]
    Analysis { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using KeepcutError.
pub type KeepcutResult<T> = Result<T, KeepcutError>;

impl KeepcutError {
    pub fn media_engine(msg: impl Into<String>) -> Self {
        Self::MediaEngine {
            message: msg.into(),
        }
    }

    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether the failure happened inside the media engine (retryable by the user).
    pub fn is_media_engine_failure(&self) -> bool {
        matches!(self, Self::MediaEngine { .. })
    }
}
