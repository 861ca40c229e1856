//! On-disk edit session.
//!
//! A session ties a source file to its cut list. Keep segments are derived
//! state and are never written.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cut_list::CutListModel;
use crate::error::EditError;

/// Current session schema version.
pub const SESSION_VERSION: &str = "1.0";

/// Top-level session file (`*.keepcut.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditSession {
    /// Schema version.
    pub version: String,

    /// Source media the cuts refer to.
    pub source: Option<PathBuf>,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,

    /// Trim window and cuts.
    pub model: CutListModel,
}

impl EditSession {
    /// Create a new session for a source of `duration` seconds.
    pub fn new(source: Option<PathBuf>, duration: f64) -> Result<Self, EditError> {
        let now = chrono::Utc::now().to_rfc3339();
        Ok(Self {
            version: SESSION_VERSION.to_string(),
            source,
            created_at: now.clone(),
            modified_at: now,
            model: CutListModel::new(duration)?,
        })
    }

    /// Load a session, re-checking every model invariant.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| EditError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut session: EditSession =
            serde_json::from_str(&json).map_err(|e| EditError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        session.model.validate()?;
        session.model.reseed_ids();
        Ok(session)
    }

    /// Save the session, stamping `modified_at`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), EditError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EditError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        self.modified_at = chrono::Utc::now().to_rfc3339();
        let json = serde_json::to_string_pretty(self).map_err(|e| EditError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| EditError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Default session path for a source file: `clip.mp4` → `clip.keepcut.json`.
pub fn default_session_path(source: &Path) -> PathBuf {
    source.with_extension("keepcut.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cut::CutKind;
    use crate::interval::Interval;

    #[test]
    fn test_session_save_and_load() {
        let dir = std::env::temp_dir().join("keepcut_test_session");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("clip.keepcut.json");

        let mut session = EditSession::new(Some(PathBuf::from("clip.mp4")), 12.0).unwrap();
        session.model.replace_ai_cuts(vec![(
            CutKind::Filler,
            Interval::new(1.0, 1.4),
            "um".to_string(),
        )]);
        session.model.add_manual_cut(5.0, 6.0).unwrap();
        session.save(&path).unwrap();

        let mut loaded = EditSession::load(&path).unwrap();
        assert_eq!(loaded.model.cuts().len(), 2);
        assert_eq!(
            loaded.model.compute_keep_segments(),
            session.model.compute_keep_segments()
        );

        let fresh = loaded.model.add_manual_cut(8.0, 9.0).unwrap();
        assert!(session.model.cuts().iter().all(|c| c.id != fresh));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_session_file_has_no_keep_segments() {
        let session = EditSession::new(None, 5.0).unwrap();
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("segments"));
    }

    #[test]
    fn test_load_rejects_invalid_trim() {
        let dir = std::env::temp_dir().join("keepcut_test_session_invalid");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.keepcut.json");

        let session = EditSession::new(None, 5.0).unwrap();
        let mut value = serde_json::to_value(&session).unwrap();
        value["model"]["trim"]["end"] = serde_json::json!(9.0);
        std::fs::write(&path, value.to_string()).unwrap();

        assert!(matches!(
            EditSession::load(&path),
            Err(EditError::InvalidTrim { .. })
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_default_session_path() {
        assert_eq!(
            default_session_path(Path::new("/videos/clip.mp4")),
            PathBuf::from("/videos/clip.keepcut.json")
        );
    }
}
