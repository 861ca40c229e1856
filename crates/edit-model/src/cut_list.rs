//! The cut list: trim window plus cuts, projected into keep segments.

use serde::{Deserialize, Serialize};

use crate::cut::{Cut, CutId, CutKind};
use crate::error::EditError;
use crate::interval::{self, Interval, Segment, EPSILON};

/// Smallest gap ever allowed between trim start and trim end.
pub const MIN_TRIM_GAP_SECS: f64 = 1e-3;

/// The region of the source under consideration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimWindow {
    pub start: f64,
    pub end: f64,
}

impl TrimWindow {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    pub fn duration(&self) -> f64 {
        self.interval().duration()
    }
}

/// A single state transition of the cut list.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    AddManualCut { start: f64, end: f64 },
    ToggleCut(CutId),
    SetCutEnabled { id: CutId, enabled: bool },
    RemoveCut(CutId),
    SetTrimStart { secs: f64, min_gap: f64 },
    SetTrimEnd { secs: f64, min_gap: f64 },
}

/// Trim window, AI cuts, and manual cuts for one source.
///
/// Keep segments are never stored; [`CutListModel::compute_keep_segments`]
/// derives them from the current state on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutListModel {
    duration: f64,
    trim: TrimWindow,
    cuts: Vec<Cut>,
    #[serde(default)]
    next_id: u64,
}

impl CutListModel {
    /// Create a model for a source of `duration` seconds with the trim window
    /// spanning the whole source and no cuts.
    pub fn new(duration: f64) -> Result<Self, EditError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(EditError::InvalidDuration { duration });
        }
        Ok(Self {
            duration,
            trim: TrimWindow {
                start: 0.0,
                end: duration,
            },
            cuts: Vec::new(),
            next_id: 1,
        })
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn trim(&self) -> TrimWindow {
        self.trim
    }

    /// All cuts in insertion order.
    pub fn cuts(&self) -> &[Cut] {
        &self.cuts
    }

    pub fn cut(&self, id: CutId) -> Option<&Cut> {
        self.cuts.iter().find(|c| c.id == id)
    }

    pub fn ai_cuts(&self) -> impl Iterator<Item = &Cut> {
        self.cuts.iter().filter(|c| c.kind.is_ai())
    }

    pub fn manual_cuts(&self) -> impl Iterator<Item = &Cut> {
        self.cuts.iter().filter(|c| c.kind == CutKind::Manual)
    }

    /// Enabled cuts, in insertion order.
    pub fn enabled_cuts(&self) -> impl Iterator<Item = &Cut> {
        self.cuts.iter().filter(|c| c.enabled)
    }

    /// Add an enabled manual cut.
    ///
    /// Rejects `end <= start`, `start < 0`, and `end > duration` without
    /// touching the model.
    pub fn add_manual_cut(&mut self, start: f64, end: f64) -> Result<CutId, EditError> {
        let valid = start.is_finite()
            && end.is_finite()
            && start >= 0.0
            && end > start
            && end <= self.duration;
        if !valid {
            return Err(EditError::InvalidRange {
                start,
                end,
                duration: self.duration,
            });
        }

        let id = self.push_cut(start, end, CutKind::Manual, format!("{start:.2}s - {end:.2}s"));
        tracing::debug!(%id, start, end, "Added manual cut");
        Ok(id)
    }

    /// Flip a cut's enabled flag, returning the new value.
    pub fn toggle_cut(&mut self, id: CutId) -> Result<bool, EditError> {
        let cut = self.cut_mut(id)?;
        cut.enabled = !cut.enabled;
        Ok(cut.enabled)
    }

    pub fn set_cut_enabled(&mut self, id: CutId, enabled: bool) -> Result<(), EditError> {
        self.cut_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// Remove a manual cut. AI cuts are kept for provenance and can only be
    /// disabled.
    pub fn remove_cut(&mut self, id: CutId) -> Result<Cut, EditError> {
        let index = self
            .cuts
            .iter()
            .position(|c| c.id == id)
            .ok_or(EditError::CutNotFound { id })?;
        let kind = self.cuts[index].kind;
        if kind.is_ai() {
            return Err(EditError::NotRemovable { id, kind });
        }
        Ok(self.cuts.remove(index))
    }

    /// Move the trim start, clamped into `[0, trim_end - min_gap]`.
    /// Returns the value actually applied.
    pub fn set_trim_start(&mut self, secs: f64, min_gap: f64) -> f64 {
        let gap = min_gap.max(MIN_TRIM_GAP_SECS);
        let upper = (self.trim.end - gap).max(0.0);
        self.trim.start = clamp_range(secs, 0.0, upper);
        self.trim.start
    }

    /// Move the trim end, clamped into `[trim_start + min_gap, duration]`.
    /// Returns the value actually applied.
    pub fn set_trim_end(&mut self, secs: f64, min_gap: f64) -> f64 {
        let gap = min_gap.max(MIN_TRIM_GAP_SECS);
        let lower = (self.trim.start + gap).min(self.duration);
        self.trim.end = clamp_range(secs, lower, self.duration);
        self.trim.end
    }

    /// Replace every AI cut with the given filler and silence spans.
    ///
    /// Manual cuts are untouched. Spans are clamped to the source duration;
    /// spans with nothing left after clamping are skipped. Returns the number
    /// of AI cuts created.
    pub fn replace_ai_cuts<I>(&mut self, spans: I) -> usize
    where
        I: IntoIterator<Item = (CutKind, Interval, String)>,
    {
        self.cuts.retain(|c| !c.kind.is_ai());
        let source = Interval::new(0.0, self.duration);

        let mut created = 0;
        for (kind, span, label) in spans {
            debug_assert!(kind.is_ai());
            let Some(clipped) = span.clip(&source) else {
                tracing::debug!(start = span.start, end = span.end, %kind, "Skipping degenerate AI span");
                continue;
            };
            self.push_cut(clipped.start, clipped.end, kind, label);
            created += 1;
        }
        created
    }

    /// Intervals of all enabled cuts.
    pub fn enabled_intervals(&self) -> Vec<Interval> {
        self.enabled_cuts().map(Cut::interval).collect()
    }

    /// The canonical, sorted, non-overlapping list of segments to keep.
    pub fn compute_keep_segments(&self) -> Vec<Segment> {
        interval::subtract(&self.trim.interval(), &self.enabled_intervals())
    }

    /// Total duration that survives editing.
    pub fn kept_duration(&self) -> f64 {
        interval::total_duration(&self.compute_keep_segments())
    }

    /// Total duration removed from the trim window by enabled cuts (merged,
    /// so overlaps count once).
    pub fn removed_duration(&self) -> f64 {
        let window = self.trim.interval();
        interval::total_duration(&interval::merge_overlapping(&interval::clip_to_window(
            &window,
            &self.enabled_intervals(),
        )))
    }

    /// The first enabled cut containing `t`, if any.
    pub fn enabled_cut_at(&self, t: f64) -> Option<&Cut> {
        self.enabled_cuts().find(|c| c.contains(t))
    }

    /// Pure transition: apply `edit` to a copy of this model.
    pub fn apply(&self, edit: &Edit) -> Result<CutListModel, EditError> {
        let mut next = self.clone();
        match *edit {
            Edit::AddManualCut { start, end } => {
                next.add_manual_cut(start, end)?;
            }
            Edit::ToggleCut(id) => {
                next.toggle_cut(id)?;
            }
            Edit::SetCutEnabled { id, enabled } => next.set_cut_enabled(id, enabled)?,
            Edit::RemoveCut(id) => {
                next.remove_cut(id)?;
            }
            Edit::SetTrimStart { secs, min_gap } => {
                next.set_trim_start(secs, min_gap);
            }
            Edit::SetTrimEnd { secs, min_gap } => {
                next.set_trim_end(secs, min_gap);
            }
        }
        Ok(next)
    }

    /// Check every structural invariant. Used after deserialization.
    pub fn validate(&self) -> Result<(), EditError> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(EditError::InvalidDuration {
                duration: self.duration,
            });
        }
        let trim = self.trim;
        if !(trim.start >= 0.0 && trim.start < trim.end && trim.end <= self.duration + EPSILON) {
            return Err(EditError::InvalidTrim {
                start: trim.start,
                end: trim.end,
                duration: self.duration,
            });
        }

        let mut seen = std::collections::HashSet::new();
        for cut in &self.cuts {
            if !seen.insert(cut.id) {
                return Err(EditError::DuplicateId { id: cut.id });
            }
            if cut.interval().is_degenerate()
                || cut.start < 0.0
                || cut.end > self.duration + EPSILON
            {
                return Err(EditError::InvalidRange {
                    start: cut.start,
                    end: cut.end,
                    duration: self.duration,
                });
            }
        }
        Ok(())
    }

    /// Re-derive the id counter so fresh ids never collide with loaded ones.
    pub(crate) fn reseed_ids(&mut self) {
        let max_id = self.cuts.iter().map(|c| c.id.0).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1);
    }

    fn push_cut(&mut self, start: f64, end: f64, kind: CutKind, label: String) -> CutId {
        let id = CutId(self.next_id);
        self.next_id += 1;
        self.cuts.push(Cut {
            id,
            start,
            end,
            kind,
            label,
            enabled: true,
        });
        id
    }

    fn cut_mut(&mut self, id: CutId) -> Result<&mut Cut, EditError> {
        self.cuts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(EditError::CutNotFound { id })
    }
}

/// Summary of how keep segments changed across a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentDiff {
    pub segments_before: usize,
    pub segments_after: usize,
    /// Kept duration after minus kept duration before.
    pub kept_delta_secs: f64,
    pub changed: bool,
}

impl SegmentDiff {
    pub fn between(before: &[Segment], after: &[Segment]) -> Self {
        Self {
            segments_before: before.len(),
            segments_after: after.len(),
            kept_delta_secs: interval::total_duration(after) - interval::total_duration(before),
            changed: before != after,
        }
    }
}

fn clamp_range(value: f64, lower: f64, upper: f64) -> f64 {
    value.max(lower).min(upper)
}
