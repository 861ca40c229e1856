//! Create an edit session for a source video.

use std::path::PathBuf;

use keepcut_edit_model::{default_session_path, EditSession};
use keepcut_export::probe_media;

use super::secs;

pub fn run(
    video: PathBuf,
    session: Option<PathBuf>,
    duration: Option<f64>,
    force: bool,
) -> anyhow::Result<()> {
    if !video.exists() {
        anyhow::bail!("Source video not found: {}", video.display());
    }

    let duration = match duration {
        Some(d) => d,
        None => probe_media(&video)
            .map(|info| info.duration_secs)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Could not read the duration of {} (is ffprobe installed?). Pass --duration.",
                    video.display()
                )
            })?,
    };

    let session_path = session.unwrap_or_else(|| default_session_path(&video));
    if session_path.exists() && !force {
        anyhow::bail!(
            "Session already exists: {} (use --force to overwrite)",
            session_path.display()
        );
    }

    let mut edit = EditSession::new(Some(video.clone()), duration)
        .map_err(|e| anyhow::anyhow!("Failed to create session: {e}"))?;
    edit.save(&session_path)
        .map_err(|e| anyhow::anyhow!("Failed to save session: {e}"))?;

    tracing::info!(session = %session_path.display(), duration, "Session created");
    println!("Session created: {}", session_path.display());
    println!("  Source: {}", video.display());
    println!("  Duration: {}", secs(duration));

    Ok(())
}
