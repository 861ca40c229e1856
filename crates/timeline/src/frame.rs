//! Deterministic timeline frame.
//!
//! The frame is a flat list of filled rectangles in paint order. Identical
//! inputs always produce an identical frame, so redraws are idempotent and
//! can be compared directly in tests.

use serde::Serialize;

use keepcut_edit_model::{CutKind, CutListModel};

use crate::drag::TimelineGeometry;
use crate::waveform::Waveform;

const HANDLE_WIDTH_PX: f64 = 4.0;
const PLAYHEAD_WIDTH_PX: f64 = 2.0;

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Rgba(self.0, self.1, self.2, alpha)
    }
}

pub const WAVEFORM_COLOR: Rgba = Rgba(120, 170, 220, 255);
pub const DIMMED_COLOR: Rgba = Rgba(0, 0, 0, 160);
pub const HANDLE_COLOR: Rgba = Rgba(255, 255, 255, 255);
pub const PLAYHEAD_COLOR: Rgba = Rgba(255, 64, 64, 255);

/// Band colour for a cut kind.
pub fn cut_color(kind: CutKind) -> Rgba {
    match kind {
        CutKind::Filler => Rgba(250, 190, 40, 110),
        CutKind::Silence => Rgba(90, 120, 255, 110),
        CutKind::Manual => Rgba(235, 70, 90, 110),
    }
}

/// What a rectangle depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Waveform,
    CutBand,
    Dimmed,
    TrimHandle,
    Playhead,
}

/// A filled rectangle in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub color: Rgba,
    pub layer: Layer,
}

/// One rendered timeline frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub rects: Vec<Rect>,
}

impl Frame {
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &Rect> {
        self.rects.iter().filter(move |r| r.layer == layer)
    }
}

/// Draw the timeline: waveform, cut bands, dimmed out-of-trim regions,
/// trim handles, and the playhead, in that order.
///
/// Cost is linear in the frame width plus the number of cuts.
pub fn render_frame(
    model: &CutListModel,
    waveform: &Waveform,
    playhead_secs: f64,
    geometry: &TimelineGeometry,
) -> Frame {
    let duration = model.duration();
    let width = geometry.width_px.max(0.0);
    let height = geometry.height_px.max(0.0);
    let mut rects = Vec::with_capacity(width as usize + model.cuts().len() + 5);

    let columns = width.floor() as usize;
    for column in 0..columns {
        let amplitude = waveform.amplitude_at(column as f64 / width) as f64;
        let bar = (amplitude * height).max(1.0);
        rects.push(Rect {
            x: column as f64,
            y: (height - bar) / 2.0,
            w: 1.0,
            h: bar,
            color: WAVEFORM_COLOR,
            layer: Layer::Waveform,
        });
    }

    for cut in model.cuts() {
        let x0 = geometry.time_to_x(cut.start, duration);
        let x1 = geometry.time_to_x(cut.end, duration);
        let color = if cut.enabled {
            cut_color(cut.kind)
        } else {
            cut_color(cut.kind).with_alpha(35)
        };
        rects.push(Rect {
            x: x0,
            y: 0.0,
            w: (x1 - x0).max(1.0),
            h: height,
            color,
            layer: Layer::CutBand,
        });
    }

    let trim = model.trim();
    let start_x = geometry.time_to_x(trim.start, duration);
    let end_x = geometry.time_to_x(trim.end, duration);
    if start_x > 0.0 {
        rects.push(Rect {
            x: 0.0,
            y: 0.0,
            w: start_x,
            h: height,
            color: DIMMED_COLOR,
            layer: Layer::Dimmed,
        });
    }
    if end_x < width {
        rects.push(Rect {
            x: end_x,
            y: 0.0,
            w: width - end_x,
            h: height,
            color: DIMMED_COLOR,
            layer: Layer::Dimmed,
        });
    }

    for handle_x in [start_x, end_x] {
        rects.push(Rect {
            x: handle_x - HANDLE_WIDTH_PX / 2.0,
            y: 0.0,
            w: HANDLE_WIDTH_PX,
            h: height,
            color: HANDLE_COLOR,
            layer: Layer::TrimHandle,
        });
    }

    let playhead_x = geometry.time_to_x(playhead_secs.max(0.0).min(duration), duration);
    rects.push(Rect {
        x: playhead_x - PLAYHEAD_WIDTH_PX / 2.0,
        y: 0.0,
        w: PLAYHEAD_WIDTH_PX,
        h: height,
        color: PLAYHEAD_COLOR,
        layer: Layer::Playhead,
    });

    Frame {
        width,
        height,
        rects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> TimelineGeometry {
        TimelineGeometry {
            width_px: 100.0,
            height_px: 40.0,
            handle_tolerance_px: 6.0,
        }
    }

    fn model() -> CutListModel {
        let mut model = CutListModel::new(10.0).unwrap();
        model.set_trim_start(1.0, 0.1);
        model.set_trim_end(9.0, 0.1);
        model.add_manual_cut(4.0, 5.0).unwrap();
        model
    }

    #[test]
    fn test_frame_is_deterministic() {
        let waveform = Waveform::from_peaks(vec![0.1, 0.9, 0.4]);
        let a = render_frame(&model(), &waveform, 3.0, &geometry());
        let b = render_frame(&model(), &waveform, 3.0, &geometry());
        assert_eq!(a, b);
    }

    #[test]
    fn test_frame_layers() {
        let frame = render_frame(&model(), &Waveform::default(), 3.0, &geometry());

        assert_eq!(frame.layer(Layer::Waveform).count(), 100);

        let bands: Vec<&Rect> = frame.layer(Layer::CutBand).collect();
        assert_eq!(bands.len(), 1);
        assert!((bands[0].x - 40.0).abs() < 1e-9);
        assert!((bands[0].w - 10.0).abs() < 1e-9);
        assert_eq!(bands[0].color, cut_color(CutKind::Manual));

        let dimmed: Vec<&Rect> = frame.layer(Layer::Dimmed).collect();
        assert_eq!(dimmed.len(), 2);
        assert!(dimmed[0].x.abs() < 1e-9 && (dimmed[0].w - 10.0).abs() < 1e-9);
        assert!((dimmed[1].x - 90.0).abs() < 1e-9 && (dimmed[1].w - 10.0).abs() < 1e-9);

        assert_eq!(frame.layer(Layer::TrimHandle).count(), 2);
        let playhead = frame.layer(Layer::Playhead).next().unwrap();
        assert!((playhead.x - 29.0).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_cut_is_faded() {
        let mut model = model();
        let id = model.cuts()[0].id;
        model.toggle_cut(id).unwrap();
        let frame = render_frame(&model, &Waveform::default(), 0.0, &geometry());
        let band = frame.layer(Layer::CutBand).next().unwrap();
        assert_eq!(band.color.3, 35);
    }

    #[test]
    fn test_full_trim_has_no_dimmed_regions() {
        let model = CutListModel::new(10.0).unwrap();
        let frame = render_frame(&model, &Waveform::default(), 0.0, &geometry());
        assert_eq!(frame.layer(Layer::Dimmed).count(), 0);
    }
}
