//! Trim handle geometry and drag state.

use keepcut_edit_model::TrimWindow;

/// Where the pointer is in the trim-handle interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingTrimStart,
    DraggingTrimEnd,
}

impl DragState {
    pub fn is_dragging(self) -> bool {
        !matches!(self, DragState::Idle)
    }
}

/// Outcome of a pointer-down on the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerDown {
    GrabbedTrimStart,
    GrabbedTrimEnd,
    /// Not near a handle: playback was moved to this time.
    Seeked(f64),
}

/// Pixel-space layout of the timeline strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineGeometry {
    pub width_px: f64,
    pub height_px: f64,
    /// Pointer-down within this many pixels of a handle grabs it.
    pub handle_tolerance_px: f64,
}

impl TimelineGeometry {
    /// Map a source time to an x coordinate.
    pub fn time_to_x(&self, secs: f64, duration: f64) -> f64 {
        if duration <= 0.0 {
            return 0.0;
        }
        (secs / duration) * self.width_px
    }

    /// Map an x coordinate to a source time, clamped to `[0, duration]`.
    pub fn x_to_time(&self, x: f64, duration: f64) -> f64 {
        if self.width_px <= 0.0 {
            return 0.0;
        }
        ((x / self.width_px) * duration).max(0.0).min(duration)
    }

    /// Which trim handle, if any, a pointer at `x` grabs.
    ///
    /// When both handles are in reach the nearer one wins; on a tie the
    /// pointer side decides (left of the handles grabs start).
    pub fn hit_handle(&self, x: f64, trim: TrimWindow, duration: f64) -> Option<DragState> {
        let start_x = self.time_to_x(trim.start, duration);
        let end_x = self.time_to_x(trim.end, duration);
        let d_start = (x - start_x).abs();
        let d_end = (x - end_x).abs();
        let tol = self.handle_tolerance_px;

        match (d_start <= tol, d_end <= tol) {
            (false, false) => None,
            (true, false) => Some(DragState::DraggingTrimStart),
            (false, true) => Some(DragState::DraggingTrimEnd),
            (true, true) => {
                if d_start < d_end || (d_start == d_end && x <= start_x) {
                    Some(DragState::DraggingTrimStart)
                } else {
                    Some(DragState::DraggingTrimEnd)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> TimelineGeometry {
        TimelineGeometry {
            width_px: 1000.0,
            height_px: 80.0,
            handle_tolerance_px: 8.0,
        }
    }

    #[test]
    fn test_time_pixel_mapping() {
        let g = geometry();
        assert_eq!(g.time_to_x(5.0, 10.0), 500.0);
        assert_eq!(g.x_to_time(250.0, 10.0), 2.5);
        assert_eq!(g.x_to_time(-40.0, 10.0), 0.0);
        assert_eq!(g.x_to_time(1200.0, 10.0), 10.0);
    }

    #[test]
    fn test_hit_handles() {
        let g = geometry();
        let trim = TrimWindow {
            start: 2.0,
            end: 8.0,
        };
        assert_eq!(
            g.hit_handle(205.0, trim, 10.0),
            Some(DragState::DraggingTrimStart)
        );
        assert_eq!(
            g.hit_handle(792.0, trim, 10.0),
            Some(DragState::DraggingTrimEnd)
        );
        assert_eq!(g.hit_handle(500.0, trim, 10.0), None);
    }

    #[test]
    fn test_overlapping_handles_pick_nearest() {
        let g = geometry();
        let trim = TrimWindow {
            start: 5.0,
            end: 5.1,
        };
        assert_eq!(
            g.hit_handle(497.0, trim, 10.0),
            Some(DragState::DraggingTrimStart)
        );
        assert_eq!(
            g.hit_handle(509.0, trim, 10.0),
            Some(DragState::DraggingTrimEnd)
        );
    }
}
