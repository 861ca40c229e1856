//! Edit cuts and the trim window of a session.

use keepcut_common::config::TimelineDefaults;
use keepcut_edit_model::{CutId, CutListModel, Edit, SegmentDiff};

use super::{load_session, secs};
use crate::CutAction;

pub fn run(action: CutAction, timeline: &TimelineDefaults) -> anyhow::Result<()> {
    let min_gap = timeline.min_trim_gap_secs;
    let (session_path, edits) = match action {
        CutAction::Add {
            session,
            start,
            end,
        } => (session, vec![Edit::AddManualCut { start, end }]),
        CutAction::Toggle { session, id } => (session, vec![Edit::ToggleCut(CutId(id))]),
        CutAction::Remove { session, id } => (session, vec![Edit::RemoveCut(CutId(id))]),
        CutAction::Trim {
            session,
            start,
            end,
        } => {
            if start.is_none() && end.is_none() {
                anyhow::bail!("Nothing to trim: pass --start and/or --end");
            }
            let start = start.map(|secs| Edit::SetTrimStart { secs, min_gap });
            let end = end.map(|secs| Edit::SetTrimEnd { secs, min_gap });
            (session, start.into_iter().chain(end).collect())
        }
    };

    let mut session = load_session(&session_path)?;
    let before = session.model.compute_keep_segments();
    let next = apply_all(&session.model, &edits)?;
    let diff = SegmentDiff::between(&before, &next.compute_keep_segments());

    if let [Edit::AddManualCut { .. }] = edits.as_slice() {
        if let Some(cut) = next.cuts().iter().max_by_key(|c| c.id) {
            println!(
                "Added cut {}: {} - {}",
                cut.id,
                secs(cut.start),
                secs(cut.end)
            );
        }
    }

    session.model = next;
    session
        .save(&session_path)
        .map_err(|e| anyhow::anyhow!("Failed to save session: {e}"))?;

    tracing::debug!(?edits, changed = diff.changed, "Session edited");
    let trim = session.model.trim();
    println!("Trim: {} - {}", secs(trim.start), secs(trim.end));
    println!(
        "Keep segments: {} -> {} ({:+.2}s)",
        diff.segments_before, diff.segments_after, diff.kept_delta_secs
    );
    Ok(())
}

/// Apply edits in order. A trim edit that would be clamped against the
/// current opposite handle is deferred until the other handle has moved.
fn apply_all(model: &CutListModel, edits: &[Edit]) -> anyhow::Result<CutListModel> {
    let mut ordered: Vec<&Edit> = edits.iter().collect();
    if let [Edit::SetTrimStart { secs, .. }, Edit::SetTrimEnd { .. }] = edits {
        if *secs >= model.trim().end {
            ordered.reverse();
        }
    }

    let mut next = model.clone();
    for edit in ordered {
        next = next.apply(edit).map_err(|e| {
            if e.is_validation() {
                anyhow::anyhow!("Edit rejected: {e}")
            } else {
                anyhow::anyhow!("Failed to edit session: {e}")
            }
        })?;
    }
    Ok(next)
}
