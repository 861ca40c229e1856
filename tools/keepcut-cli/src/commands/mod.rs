pub mod analyze;
pub mod cut;
pub mod export;
pub mod info;
pub mod init;

use std::path::Path;

use keepcut_edit_model::EditSession;

/// Load a session, attaching the path to any error.
pub fn load_session(path: &Path) -> anyhow::Result<EditSession> {
    EditSession::load(path)
        .map_err(|e| anyhow::anyhow!("Failed to load session {}: {e}", path.display()))
}

/// `12.34s` style seconds for terminal output.
pub fn secs(value: f64) -> String {
    format!("{value:.2}s")
}
