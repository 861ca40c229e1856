//! Export progress reporting.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::engine::EngineEvents;

/// Callback receiving whole-number percentages.
pub type ProgressCallback = Box<dyn Fn(u8) + Send + Sync>;

/// Folds per-invocation fractions into one monotonic 0-100 percentage.
///
/// The callback only fires when the percentage increases, so observers
/// never see it go backwards or repeat.
pub struct ProgressTracker {
    total: usize,
    current: AtomicUsize,
    last: AtomicU8,
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    pub fn new(total_invocations: usize, callback: Option<ProgressCallback>) -> Self {
        Self {
            total: total_invocations.max(1),
            current: AtomicUsize::new(0),
            last: AtomicU8::new(0),
            callback,
        }
    }

    /// Start reporting for invocation `index` (zero based).
    pub fn begin_invocation(&self, index: usize) {
        self.current.store(index.min(self.total - 1), Ordering::SeqCst);
    }

    /// Last percentage reported.
    pub fn percent(&self) -> u8 {
        self.last.load(Ordering::SeqCst)
    }

    /// Report completion.
    pub fn finish(&self) {
        self.report(100);
    }

    fn report(&self, percent: u8) {
        let percent = percent.min(100);
        let previous = self.last.fetch_max(percent, Ordering::SeqCst);
        if percent > previous {
            if let Some(callback) = &self.callback {
                callback(percent);
            }
        }
    }
}

impl EngineEvents for ProgressTracker {
    fn progress(&self, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let index = self.current.load(Ordering::SeqCst) as f64;
        let overall = (index + fraction) / self.total as f64;
        self.report((overall * 100.0).floor() as u8);
    }

    fn log(&self, line: &str) {
        tracing::debug!(target: "keepcut::engine", "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording() -> (ProgressTracker, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let tracker = ProgressTracker::new(
            2,
            Some(Box::new(move |p| sink.lock().unwrap().push(p))),
        );
        (tracker, seen)
    }

    #[test]
    fn test_progress_spans_invocations() {
        let (tracker, seen) = recording();
        tracker.progress(0.5);
        tracker.begin_invocation(1);
        tracker.progress(0.5);
        tracker.finish();
        assert_eq!(*seen.lock().unwrap(), vec![25, 75, 100]);
    }

    #[test]
    fn test_progress_never_decreases() {
        let (tracker, seen) = recording();
        tracker.progress(0.8);
        tracker.progress(0.2);
        tracker.progress(f64::NAN);
        tracker.progress(0.8);
        assert_eq!(*seen.lock().unwrap(), vec![40]);
        assert_eq!(tracker.percent(), 40);
    }

    #[test]
    fn test_finish_reports_once() {
        let (tracker, seen) = recording();
        tracker.finish();
        tracker.finish();
        assert_eq!(*seen.lock().unwrap(), vec![100]);
    }
}
