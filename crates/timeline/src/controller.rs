//! Timeline controller: routes pointer, playback, and edit events into the
//! cut list and keeps the player and the drawn frame in sync with it.

use keepcut_common::config::TimelineDefaults;
use keepcut_edit_model::{CutId, CutListModel, Edit, EditError, Segment, SegmentDiff};

use crate::drag::{DragState, PointerDown, TimelineGeometry};
use crate::frame::{render_frame, Frame};
use crate::playback::{self, Player, SyncAction};
use crate::waveform::Waveform;

/// Controller tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineConfig {
    pub geometry: TimelineGeometry,
    /// Smallest gap kept between trim start and trim end while dragging.
    pub min_trim_gap_secs: f64,
}

impl TimelineConfig {
    pub fn from_defaults(defaults: &TimelineDefaults, width_px: f64, height_px: f64) -> Self {
        Self {
            geometry: TimelineGeometry {
                width_px,
                height_px,
                handle_tolerance_px: defaults.handle_tolerance_px,
            },
            min_trim_gap_secs: defaults.min_trim_gap_secs,
        }
    }
}

/// Summary of the edit for status display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineStatus {
    pub kept_secs: f64,
    pub removed_secs: f64,
    pub segments: usize,
    pub cuts: usize,
    pub enabled_cuts: usize,
}

/// Owns the cut list and drives a [`Player`].
///
/// Every event that can change what is visible ends with a redraw, so
/// [`TimelineController::frame`] never lags behind the model.
pub struct TimelineController<P: Player> {
    model: CutListModel,
    player: P,
    waveform: Waveform,
    config: TimelineConfig,
    drag: DragState,
    frame: Frame,
    redraws: u64,
}

impl<P: Player> TimelineController<P> {
    pub fn new(model: CutListModel, player: P, waveform: Waveform, config: TimelineConfig) -> Self {
        let mut controller = Self {
            model,
            player,
            waveform,
            config,
            drag: DragState::Idle,
            frame: Frame::default(),
            redraws: 0,
        };
        controller.redraw();
        controller
    }

    pub fn model(&self) -> &CutListModel {
        &self.model
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// The most recently drawn frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Number of redraws performed so far.
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    /// Current keep segments, computed fresh.
    pub fn keep_segments(&self) -> Vec<Segment> {
        self.model.compute_keep_segments()
    }

    pub fn status(&self) -> TimelineStatus {
        TimelineStatus {
            kept_secs: self.model.kept_duration(),
            removed_secs: self.model.removed_duration(),
            segments: self.model.compute_keep_segments().len(),
            cuts: self.model.cuts().len(),
            enabled_cuts: self.model.enabled_cuts().count(),
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
        self.redraw();
    }

    pub fn into_parts(self) -> (CutListModel, P) {
        (self.model, self.player)
    }

    // ---- Pointer ----------------------------------------------------------

    /// Pointer pressed at `x`: grab a trim handle if one is in reach,
    /// otherwise seek to the time under the pointer.
    pub fn pointer_down(&mut self, x: f64) -> PointerDown {
        let duration = self.model.duration();
        let geometry = self.config.geometry;

        match geometry.hit_handle(x, self.model.trim(), duration) {
            Some(state) => {
                self.drag = state;
                tracing::trace!(?state, x, "Trim handle grabbed");
                match state {
                    DragState::DraggingTrimStart => PointerDown::GrabbedTrimStart,
                    _ => PointerDown::GrabbedTrimEnd,
                }
            }
            None => {
                let secs = geometry.x_to_time(x, duration);
                self.seek(secs);
                PointerDown::Seeked(secs)
            }
        }
    }

    /// Pointer moved to `x`. Only has an effect while dragging.
    pub fn pointer_move(&mut self, x: f64) {
        let secs = self
            .config
            .geometry
            .x_to_time(x, self.model.duration());
        let min_gap = self.config.min_trim_gap_secs;

        let edit = match self.drag {
            DragState::Idle => return,
            DragState::DraggingTrimStart => Edit::SetTrimStart { secs, min_gap },
            DragState::DraggingTrimEnd => Edit::SetTrimEnd { secs, min_gap },
        };
        // Trim edits are clamped, never rejected.
        if let Err(e) = self.apply(edit) {
            tracing::warn!(error = %e, "Trim drag rejected");
        }
    }

    /// Pointer released: end any drag.
    pub fn pointer_up(&mut self) {
        if self.drag.is_dragging() {
            let trim = self.model.trim();
            tracing::debug!(start = trim.start, end = trim.end, "Trim drag finished");
        }
        self.drag = DragState::Idle;
    }

    // ---- Playback ---------------------------------------------------------

    /// Move playback to `secs` (clamped to the source) and redraw.
    pub fn seek(&mut self, secs: f64) {
        let secs = secs.max(0.0).min(self.model.duration());
        self.player.seek(secs);
        self.redraw();
    }

    /// Media "time advanced" tick.
    pub fn on_time_update(&mut self) -> SyncAction {
        let action = playback::sync_player(&self.model, &mut self.player);
        if action != SyncAction::Continue {
            tracing::trace!(?action, "Playback corrected");
        }
        self.redraw();
        action
    }

    /// Playback started. Restarts from the trim start when parked at the end.
    pub fn on_play(&mut self) {
        if self.player.current_time() >= self.model.trim().end {
            self.player.seek(self.model.trim().start);
        }
        self.on_time_update();
    }

    pub fn on_pause(&mut self) {
        self.redraw();
    }

    // ---- Edits ------------------------------------------------------------

    pub fn toggle_cut(&mut self, id: CutId) -> Result<(), EditError> {
        self.apply(Edit::ToggleCut(id))
    }

    pub fn set_cut_enabled(&mut self, id: CutId, enabled: bool) -> Result<(), EditError> {
        self.apply(Edit::SetCutEnabled { id, enabled })
    }

    /// Add a manual cut. Invalid ranges leave the model and frame untouched.
    pub fn add_manual_cut(&mut self, start: f64, end: f64) -> Result<CutId, EditError> {
        let mut next = self.model.clone();
        let id = next.add_manual_cut(start, end)?;
        self.commit(&Edit::AddManualCut { start, end }, next);
        Ok(id)
    }

    pub fn remove_cut(&mut self, id: CutId) -> Result<(), EditError> {
        self.apply(Edit::RemoveCut(id))
    }

    /// Run a model transition, then redraw. On error nothing changes.
    fn apply(&mut self, edit: Edit) -> Result<(), EditError> {
        let next = self.model.apply(&edit)?;
        self.commit(&edit, next);
        Ok(())
    }

    fn commit(&mut self, edit: &Edit, next: CutListModel) {
        let diff = SegmentDiff::between(
            &self.model.compute_keep_segments(),
            &next.compute_keep_segments(),
        );
        if diff.changed {
            tracing::debug!(
                ?edit,
                segments = diff.segments_after,
                kept_delta_secs = diff.kept_delta_secs,
                "Keep segments changed"
            );
        }
        self.model = next;
        self.redraw();
    }

    fn redraw(&mut self) {
        self.frame = render_frame(
            &self.model,
            &self.waveform,
            self.player.current_time(),
            &self.config.geometry,
        );
        self.redraws += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Layer;

    #[derive(Debug, Default)]
    struct FakePlayer {
        time: f64,
        paused: bool,
    }

    impl Player for FakePlayer {
        fn current_time(&self) -> f64 {
            self.time
        }
        fn seek(&mut self, secs: f64) {
            self.time = secs;
        }
        fn pause(&mut self) {
            self.paused = true;
        }
        fn is_paused(&self) -> bool {
            self.paused
        }
    }

    fn controller() -> TimelineController<FakePlayer> {
        let config = TimelineConfig {
            geometry: TimelineGeometry {
                width_px: 1000.0,
                height_px: 60.0,
                handle_tolerance_px: 8.0,
            },
            min_trim_gap_secs: 0.5,
        };
        TimelineController::new(
            CutListModel::new(10.0).unwrap(),
            FakePlayer::default(),
            Waveform::default(),
            config,
        )
    }

    #[test]
    fn test_drag_trim_start() {
        let mut c = controller();
        assert_eq!(c.pointer_down(3.0), PointerDown::GrabbedTrimStart);
        assert_eq!(c.drag_state(), DragState::DraggingTrimStart);

        c.pointer_move(250.0);
        assert_eq!(c.model().trim().start, 2.5);

        c.pointer_up();
        assert_eq!(c.drag_state(), DragState::Idle);

        c.pointer_move(600.0);
        assert_eq!(c.model().trim().start, 2.5);
    }

    #[test]
    fn test_drag_end_cannot_cross_start() {
        let mut c = controller();
        c.pointer_down(0.0);
        c.pointer_move(400.0);
        c.pointer_up();

        assert_eq!(c.pointer_down(998.0), PointerDown::GrabbedTrimEnd);
        c.pointer_move(100.0);
        let trim = c.model().trim();
        assert!((trim.end - 4.5).abs() < 1e-9);
        assert!(trim.start < trim.end);
    }

    #[test]
    fn test_pointer_down_away_from_handles_seeks() {
        let mut c = controller();
        assert_eq!(c.pointer_down(500.0), PointerDown::Seeked(5.0));
        assert_eq!(c.player().current_time(), 5.0);
        assert_eq!(c.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_every_drag_move_redraws() {
        let mut c = controller();
        let before = c.redraw_count();
        c.pointer_down(0.0);
        c.pointer_move(100.0);
        c.pointer_move(200.0);
        assert_eq!(c.redraw_count(), before + 2);

        let dimmed = c.frame().layer(Layer::Dimmed).next().unwrap();
        assert!((dimmed.w - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_tick_skips_over_cut() {
        let mut c = controller();
        c.add_manual_cut(2.0, 3.0).unwrap();
        c.player_mut().seek(2.2);
        assert_eq!(c.on_time_update(), SyncAction::SkipTo(3.0));
        assert_eq!(c.player().current_time(), 3.0);
    }

    #[test]
    fn test_tick_at_trim_end_pauses() {
        let mut c = controller();
        c.pointer_down(1000.0);
        c.pointer_move(800.0);
        c.pointer_up();

        c.player_mut().seek(8.3);
        assert_eq!(c.on_time_update(), SyncAction::PauseAtTrimEnd(8.0));
        assert!(c.player().is_paused());
        assert_eq!(c.player().current_time(), 8.0);
    }

    #[test]
    fn test_play_from_end_restarts_at_trim_start() {
        let mut c = controller();
        c.pointer_down(0.0);
        c.pointer_move(100.0);
        c.pointer_up();
        c.player_mut().seek(10.0);

        c.on_play();
        assert_eq!(c.player().current_time(), 1.0);
    }

    #[test]
    fn test_invalid_manual_cut_leaves_state() {
        let mut c = controller();
        let redraws = c.redraw_count();
        assert!(matches!(
            c.add_manual_cut(5.0, 3.0),
            Err(EditError::InvalidRange { .. })
        ));
        assert!(c.model().cuts().is_empty());
        assert_eq!(c.redraw_count(), redraws);
    }

    #[test]
    fn test_toggle_updates_segments_and_frame() {
        let mut c = controller();
        let id = c.add_manual_cut(4.0, 6.0).unwrap();
        assert_eq!(c.keep_segments().len(), 2);

        assert_eq!(c.status().enabled_cuts, 1);
        assert!((c.status().kept_secs - 8.0).abs() < 1e-9);

        c.toggle_cut(id).unwrap();
        assert_eq!(c.keep_segments().len(), 1);
        let status = c.status();
        assert_eq!((status.cuts, status.enabled_cuts, status.segments), (1, 0, 1));
        let band = c.frame().layer(Layer::CutBand).next().unwrap();
        assert_eq!(band.color.3, 35);
    }

    #[test]
    fn test_config_from_app_defaults() {
        let defaults = TimelineDefaults::default();
        let config = TimelineConfig::from_defaults(&defaults, 1000.0, 60.0);
        assert_eq!(config.geometry.width_px, 1000.0);
        assert_eq!(config.geometry.height_px, 60.0);
        assert_eq!(config.geometry.handle_tolerance_px, defaults.handle_tolerance_px);
        assert_eq!(config.min_trim_gap_secs, defaults.min_trim_gap_secs);

        let mut c = TimelineController::new(
            CutListModel::new(10.0).unwrap(),
            FakePlayer::default(),
            Waveform::default(),
            config,
        );
        assert_eq!(c.pointer_down(998.0), PointerDown::GrabbedTrimEnd);
        c.pointer_move(0.0);
        let trim = c.model().trim();
        assert!((trim.end - defaults.min_trim_gap_secs).abs() < 1e-9);
    }
}
