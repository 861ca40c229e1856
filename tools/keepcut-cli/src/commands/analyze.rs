//! Seed AI cuts from a transcript.

use std::path::{Path, PathBuf};

use keepcut_common::config::AnalysisDefaults;
use keepcut_common::error::{KeepcutError, KeepcutResult};
use keepcut_edit_model::{detect_word_gap_silences, CutKind, Transcript};

use super::load_session;

pub fn run(
    session_path: PathBuf,
    transcript: PathBuf,
    detect_silences: bool,
    analysis: &AnalysisDefaults,
) -> anyhow::Result<()> {
    let mut session = load_session(&session_path)?;
    let duration = session.model.duration();

    let result = read_transcript(&transcript).map(|mut t| {
        if detect_silences && t.silences.is_empty() {
            t.silences = detect_word_gap_silences(
                &t.words,
                duration,
                analysis.min_silence_secs,
                analysis.silence_padding_secs,
            );
            tracing::debug!(silences = t.silences.len(), "Derived silences from word gaps");
        }
        t
    });
    if let Err(e) = &result {
        println!("Analysis unavailable: {e}");
        println!("  Continuing with manual cuts only.");
    }

    let created = session.model.seed_from_analysis(result);
    session
        .save(&session_path)
        .map_err(|e| anyhow::anyhow!("Failed to save session: {e}"))?;

    let count = |kind: CutKind| session.model.cuts().iter().filter(|c| c.kind == kind).count();
    println!("AI cuts: {created}");
    println!("  Filler: {}", count(CutKind::Filler));
    println!("  Silence: {}", count(CutKind::Silence));
    println!("  Manual (kept): {}", count(CutKind::Manual));
    println!(
        "  Kept duration: {:.2}s of {:.2}s",
        session.model.kept_duration(),
        duration
    );

    Ok(())
}

fn read_transcript(path: &Path) -> KeepcutResult<Transcript> {
    if !path.exists() {
        return Err(KeepcutError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let json = std::fs::read_to_string(path)?;
    Transcript::from_json(&json)
        .map_err(|e| KeepcutError::analysis(format!("invalid transcript {}: {e}", path.display())))
}
