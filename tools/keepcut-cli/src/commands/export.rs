//! Export a session's kept material.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;

use keepcut_common::config::ExportDefaults;
use keepcut_export::{
    probe_media, ExportCompiler, ExportFormat, ExportRequest, ExportSettings, ExportSource,
    FfmpegEngine, ProgressCallback,
};

use super::{load_session, secs};

pub async fn run(
    session_path: PathBuf,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    defaults: &ExportDefaults,
) -> anyhow::Result<()> {
    let session = load_session(&session_path)?;
    let input = input
        .or_else(|| session.source.clone())
        .ok_or_else(|| anyhow::anyhow!("Session has no source video; pass --input"))?;
    if !input.exists() {
        anyhow::bail!("Source video not found: {}", input.display());
    }

    let settings = ExportSettings::from_defaults(defaults)?;
    let output_path = output.unwrap_or_else(|| default_output_path(&input, settings.format));
    let segments = session.model.compute_keep_segments();

    println!("Exporting: {}", input.display());
    println!("  Output: {}", output_path.display());
    println!(
        "  Format: {} {} @ {}",
        settings.format, settings.resolution, settings.frame_rate
    );
    println!(
        "  Keep segments: {} ({})",
        segments.len(),
        secs(session.model.kept_duration())
    );

    let source_has_audio = match probe_media(&input) {
        Some(info) => info.has_audio,
        None => {
            tracing::warn!(input = %input.display(), "ffprobe failed; exporting without audio");
            false
        }
    };

    let engine = FfmpegEngine::new()?;
    if !segments.is_empty() && !engine.is_available() {
        anyhow::bail!("ffmpeg not found on PATH");
    }

    let progress: ProgressCallback = Box::new(|percent| {
        print!("\r  Progress: {percent:>3}%");
        let _ = std::io::stdout().flush();
    });

    let request = ExportRequest {
        source: ExportSource::File(&input),
        segments: &segments,
        settings,
        source_has_audio,
    };
    let result = ExportCompiler::new()
        .export(&engine, request, Some(progress))
        .await;
    println!();
    let exported = result.context("Export failed")?;

    tokio::fs::write(&output_path, &exported.bytes)
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!(
        "Export complete: {} ({}, {} bytes, {})",
        output_path.display(),
        exported.mime_type(),
        exported.bytes.len(),
        secs(exported.duration_secs)
    );
    Ok(())
}

/// `talk.mp4` exported as GIF becomes `talk.cut.gif` next to it.
fn default_output_path(input: &Path, format: ExportFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}.cut.{}", format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/videos/talk.mp4"), ExportFormat::Gif),
            PathBuf::from("/videos/talk.cut.gif")
        );
        assert_eq!(
            default_output_path(Path::new("clip.mov"), ExportFormat::Mp4),
            PathBuf::from("clip.cut.mp4")
        );
    }
}
