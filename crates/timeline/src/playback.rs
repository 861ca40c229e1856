//! Playback synchronization with the cut list.

use keepcut_edit_model::CutListModel;

/// The video player the timeline drives.
pub trait Player {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Move playback to `secs`.
    fn seek(&mut self, secs: f64);

    /// Stop advancing playback.
    fn pause(&mut self);

    /// Whether playback is currently stopped.
    fn is_paused(&self) -> bool;
}

/// What a playback tick should do to stay consistent with the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncAction {
    /// Position is inside kept material.
    Continue,
    /// Before the trim window: jump to its start, or past the cuts that
    /// cover it.
    SnapToTrimStart(f64),
    /// At or past the trim window: pause at its end.
    PauseAtTrimEnd(f64),
    /// Inside an enabled cut: jump past it (and past any cut it lands in).
    SkipTo(f64),
}

/// Decide how playback at `t` must be corrected.
///
/// Skipping is iterative: a jump to a cut's end that lands inside another
/// enabled cut keeps going until it reaches kept material or the trim end.
/// A snap to the trim start skips the same way, so it never lands in a cut.
pub fn resolve(model: &CutListModel, t: f64) -> SyncAction {
    let trim = model.trim();
    if t < trim.start {
        let position = skip_cuts(model, trim.start);
        return if position >= trim.end {
            SyncAction::PauseAtTrimEnd(trim.end)
        } else {
            SyncAction::SnapToTrimStart(position)
        };
    }
    if t >= trim.end {
        return SyncAction::PauseAtTrimEnd(trim.end);
    }

    let position = skip_cuts(model, t);
    if position >= trim.end {
        SyncAction::PauseAtTrimEnd(trim.end)
    } else if position > t {
        SyncAction::SkipTo(position)
    } else {
        SyncAction::Continue
    }
}

/// First position at or after `from` that is not inside an enabled cut.
fn skip_cuts(model: &CutListModel, from: f64) -> f64 {
    let mut position = from;
    // Each hop strictly advances past a cut end, so at most one hop per cut.
    for _ in 0..=model.cuts().len() {
        match model.enabled_cut_at(position) {
            Some(cut) => position = cut.end,
            None => break,
        }
    }
    position
}

/// Apply [`resolve`] to a player.
pub fn sync_player<P: Player + ?Sized>(model: &CutListModel, player: &mut P) -> SyncAction {
    let action = resolve(model, player.current_time());
    match action {
        SyncAction::Continue => {}
        SyncAction::SnapToTrimStart(secs) | SyncAction::SkipTo(secs) => player.seek(secs),
        SyncAction::PauseAtTrimEnd(secs) => {
            player.pause();
            player.seek(secs);
        }
    }
    action
}
