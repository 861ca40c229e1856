//! Cut entities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// Stable identifier of a cut within one edit model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CutId(pub u64);

impl fmt::Display for CutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a cut came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutKind {
    /// Filler word detected by transcript analysis ("um", "uh", ...).
    Filler,
    /// Long pause detected by transcript analysis.
    Silence,
    /// Added by the user.
    Manual,
}

impl CutKind {
    /// AI cuts can be disabled but never removed.
    pub fn is_ai(self) -> bool {
        matches!(self, CutKind::Filler | CutKind::Silence)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CutKind::Filler => "filler",
            CutKind::Silence => "silence",
            CutKind::Manual => "manual",
        }
    }
}

impl fmt::Display for CutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A region marked for removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    pub id: CutId,
    /// Start time in seconds (`>= 0`).
    pub start: f64,
    /// End time in seconds (`> start`).
    pub end: f64,
    pub kind: CutKind,
    /// Human-readable description (the filler word, "1.4s silence", ...).
    pub label: String,
    /// Only enabled cuts are removed from the output.
    pub enabled: bool,
}

impl Cut {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    pub fn duration(&self) -> f64 {
        self.interval().duration()
    }

    /// Whether `t` falls inside this cut.
    pub fn contains(&self, t: f64) -> bool {
        self.interval().contains(t)
    }
}
