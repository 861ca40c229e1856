//! Interval algebra over the source timeline.
//!
//! Everything here is pure: inputs are never mutated and outputs are freshly
//! allocated, sorted, and non-overlapping.

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing accumulated durations.
pub const EPSILON: f64 = 1e-9;

/// A half-open time range `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

/// A region of the source that survives editing.
///
/// Keep segments are only ever produced by [`subtract`]; they are never
/// edited directly.
pub type Segment = Interval;

impl Interval {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length in seconds (zero for degenerate intervals).
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// `true` when the interval has no positive, finite extent.
    pub fn is_degenerate(&self) -> bool {
        !(self.start.is_finite() && self.end.is_finite() && self.end > self.start)
    }

    /// Whether `t` falls inside `[start, end)`.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }

    /// Intersection with `bounds`, or `None` when nothing positive remains.
    pub fn clip(&self, bounds: &Interval) -> Option<Interval> {
        let clipped = Interval::new(self.start.max(bounds.start), self.end.min(bounds.end));
        (!clipped.is_degenerate()).then_some(clipped)
    }
}

/// Merge overlapping or touching intervals.
///
/// Degenerate inputs are ignored. The result is sorted by start and minimal:
/// no two output intervals overlap or touch.
pub fn merge_overlapping(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals
        .iter()
        .copied()
        .filter(|iv| !iv.is_degenerate())
        .collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        match merged.last_mut() {
            Some(current) if iv.start <= current.end => {
                current.end = current.end.max(iv.end);
            }
            _ => merged.push(iv),
        }
    }
    merged
}

/// Clip every interval to `window`, dropping those that fall fully outside.
pub fn clip_to_window(window: &Interval, intervals: &[Interval]) -> Vec<Interval> {
    intervals.iter().filter_map(|iv| iv.clip(window)).collect()
}

/// Remove `cuts` from `window`, returning the gaps that remain.
///
/// Cuts are clipped to the window and merged before the sweep, so
/// overlapping cuts are never subtracted twice. Zero-length gaps are dropped.
/// An empty result means the cuts cover the whole window.
pub fn subtract(window: &Interval, cuts: &[Interval]) -> Vec<Segment> {
    if window.is_degenerate() {
        return Vec::new();
    }

    let removed = merge_overlapping(&clip_to_window(window, cuts));

    let mut segments = Vec::with_capacity(removed.len() + 1);
    let mut cursor = window.start;
    for cut in &removed {
        if cut.start > cursor {
            segments.push(Segment::new(cursor, cut.start));
        }
        cursor = cursor.max(cut.end);
    }
    if window.end > cursor {
        segments.push(Segment::new(cursor, window.end));
    }
    segments
}

/// Sum of interval durations.
pub fn total_duration(intervals: &[Interval]) -> f64 {
    intervals.iter().map(Interval::duration).sum()
}
