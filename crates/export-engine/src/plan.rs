//! Export plans.
//!
//! A plan is the pure description of how keep segments become one output
//! file. It is compiled from segments and settings without touching any
//! engine, then rendered to a single ffmpeg invocation.

use serde::Serialize;

use keepcut_edit_model::{merge_overlapping, total_duration, Segment};

use crate::settings::{ExportFormat, ExportSettings, PaletteStatsMode};

/// Label of the final video stream in every filter graph.
const VIDEO_OUT: &str = "[vout]";

/// How the concatenated video is conformed to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VideoFilter {
    /// Fit inside `width`x`height` preserving aspect, pad the remainder
    /// with black, square pixels, constant frame rate.
    Letterbox { width: u32, height: u32, fps: u32 },
    /// Resample to `fps`, scale to `width` (height follows aspect), then a
    /// two-pass palette generate/apply.
    GifPalette {
        width: u32,
        fps: u32,
        stats_mode: PaletteStatsMode,
    },
}

/// Final encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Encode {
    Mp4 { crf: u32, audio: bool },
    Gif,
}

/// One step of a plan, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Read `segment` of the source as input `index`.
    Extract { index: usize, segment: Segment },
    /// Join `inputs` extracted inputs back to back.
    Concat { inputs: usize, audio: bool },
    Filter(VideoFilter),
    Encode(Encode),
}

/// Tagged description of an export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "plan", rename_all = "snake_case")]
pub enum ExportPlan {
    /// Nothing is kept; the output is a valid empty container.
    Empty { format: ExportFormat },
    /// One kept segment: extract, conform, encode.
    Single {
        segment: Segment,
        filter: VideoFilter,
        encode: Encode,
        audio: bool,
    },
    /// Several kept segments: extract each, concatenate, conform, encode.
    Multi {
        segments: Vec<Segment>,
        filter: VideoFilter,
        encode: Encode,
        audio: bool,
    },
}

/// A single engine run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invocation {
    pub args: Vec<String>,
    /// Output duration the run is expected to produce, for progress.
    pub expected_duration_secs: f64,
}

impl ExportPlan {
    /// Compile keep segments into a plan.
    ///
    /// Segments are sorted and merged first. Anything shorter than one
    /// output frame is dropped, since it cannot produce a frame. Audio is
    /// carried only when the source has it and the format can hold it.
    pub fn compile(segments: &[Segment], settings: &ExportSettings, source_has_audio: bool) -> Self {
        let fps = settings.frame_rate.fps();
        let min_duration = 1.0 / f64::from(fps);
        let segments: Vec<Segment> = merge_overlapping(segments)
            .into_iter()
            .filter(|s| s.duration() >= min_duration)
            .collect();

        let audio = source_has_audio && settings.format.supports_audio();
        let (filter, encode) = match settings.format {
            ExportFormat::Mp4 => {
                let (width, height) = settings.resolution.dimensions();
                (
                    VideoFilter::Letterbox { width, height, fps },
                    Encode::Mp4 {
                        crf: settings.mp4_crf,
                        audio,
                    },
                )
            }
            ExportFormat::Gif => (
                VideoFilter::GifPalette {
                    width: settings.resolution.gif_width(),
                    fps,
                    stats_mode: settings.gif_stats_mode,
                },
                Encode::Gif,
            ),
        };

        match segments.as_slice() {
            [] => ExportPlan::Empty {
                format: settings.format,
            },
            [segment] => ExportPlan::Single {
                segment: *segment,
                filter,
                encode,
                audio,
            },
            _ => ExportPlan::Multi {
                segments,
                filter,
                encode,
                audio,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ExportPlan::Empty { .. })
    }

    pub fn format(&self) -> ExportFormat {
        match self {
            ExportPlan::Empty { format } => *format,
            ExportPlan::Single { encode, .. } | ExportPlan::Multi { encode, .. } => match encode {
                Encode::Mp4 { .. } => ExportFormat::Mp4,
                Encode::Gif => ExportFormat::Gif,
            },
        }
    }

    pub fn segments(&self) -> &[Segment] {
        match self {
            ExportPlan::Empty { .. } => &[],
            ExportPlan::Single { segment, .. } => std::slice::from_ref(segment),
            ExportPlan::Multi { segments, .. } => segments,
        }
    }

    /// Total duration of the exported material.
    pub fn output_duration(&self) -> f64 {
        total_duration(self.segments())
    }

    /// Number of engine runs the plan needs.
    pub fn invocation_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            1
        }
    }

    /// Steps in execution order.
    pub fn operations(&self) -> Vec<Operation> {
        let (filter, encode, audio) = match self {
            ExportPlan::Empty { .. } => return Vec::new(),
            ExportPlan::Single {
                filter,
                encode,
                audio,
                ..
            }
            | ExportPlan::Multi {
                filter,
                encode,
                audio,
                ..
            } => (*filter, *encode, *audio),
        };

        let mut ops: Vec<Operation> = self
            .segments()
            .iter()
            .enumerate()
            .map(|(index, segment)| Operation::Extract {
                index,
                segment: *segment,
            })
            .collect();
        if let ExportPlan::Multi { segments, .. } = self {
            ops.push(Operation::Concat {
                inputs: segments.len(),
                audio,
            });
        }
        ops.push(Operation::Filter(filter));
        ops.push(Operation::Encode(encode));
        ops
    }

    /// Render the plan as ffmpeg arguments reading `input` and writing
    /// `output`. Returns `None` for an empty plan.
    pub fn to_invocation(&self, input: &str, output: &str) -> Option<Invocation> {
        let (filter, encode, audio) = match self {
            ExportPlan::Empty { .. } => return None,
            ExportPlan::Single {
                filter,
                encode,
                audio,
                ..
            }
            | ExportPlan::Multi {
                filter,
                encode,
                audio,
                ..
            } => (*filter, *encode, *audio),
        };

        let segments = self.segments();
        let mut args = vec!["-y".to_string()];
        for segment in segments {
            args.extend([
                "-ss".to_string(),
                format_secs(segment.start),
                "-t".to_string(),
                format_secs(segment.duration()),
                "-i".to_string(),
                input.to_string(),
            ]);
        }

        let (graph, audio_map) = if segments.len() == 1 {
            (
                format!("[0:v]{}{VIDEO_OUT}", filter_chain(&filter)),
                audio.then(|| "0:a:0".to_string()),
            )
        } else {
            let mut graph = String::new();
            for index in 0..segments.len() {
                graph.push_str(&format!("[{index}:v]"));
                if audio {
                    graph.push_str(&format!("[{index}:a]"));
                }
            }
            graph.push_str(&format!(
                "concat=n={}:v=1:a={}[cv]",
                segments.len(),
                u8::from(audio)
            ));
            if audio {
                graph.push_str("[ca]");
            }
            graph.push_str(&format!(";[cv]{}{VIDEO_OUT}", filter_chain(&filter)));
            (graph, audio.then(|| "[ca]".to_string()))
        };

        args.extend([
            "-filter_complex".to_string(),
            graph,
            "-map".to_string(),
            VIDEO_OUT.to_string(),
        ]);
        match audio_map {
            Some(map) => args.extend(["-map".to_string(), map]),
            None => args.push("-an".to_string()),
        }
        args.extend(encode_args(&encode));
        args.push(output.to_string());

        Some(Invocation {
            args,
            expected_duration_secs: self.output_duration(),
        })
    }
}

/// Video filter chain body (without input/output labels).
fn filter_chain(filter: &VideoFilter) -> String {
    match *filter {
        VideoFilter::Letterbox { width, height, fps } => format!(
            "scale={width}:{height}:force_original_aspect_ratio=decrease,\
             pad={width}:{height}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={fps}"
        ),
        VideoFilter::GifPalette {
            width,
            fps,
            stats_mode,
        } => format!(
            "fps={fps},scale={width}:-1:flags=lanczos,split[s0][s1];\
             [s0]palettegen=stats_mode={}[p];[s1][p]paletteuse",
            stats_mode.as_str()
        ),
    }
}

fn encode_args(encode: &Encode) -> Vec<String> {
    match *encode {
        Encode::Mp4 { crf, audio } => {
            let mut args = vec![
                "-c:v".to_string(),
                "libx264".to_string(),
                "-preset".to_string(),
                "medium".to_string(),
                "-crf".to_string(),
                crf.to_string(),
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
            ];
            if audio {
                args.extend([
                    "-c:a".to_string(),
                    "aac".to_string(),
                    "-b:a".to_string(),
                    "128k".to_string(),
                ]);
            }
            args.extend(["-movflags".to_string(), "+faststart".to_string()]);
            args
        }
        Encode::Gif => vec!["-loop".to_string(), "0".to_string()],
    }
}

fn format_secs(secs: f64) -> String {
    format!("{:.6}", secs.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{FrameRate, Resolution};

    fn mp4() -> ExportSettings {
        ExportSettings::default()
    }

    fn gif() -> ExportSettings {
        ExportSettings {
            format: ExportFormat::Gif,
            resolution: Resolution::P480,
            frame_rate: FrameRate::Fps15,
            ..ExportSettings::default()
        }
    }

    fn arg_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_empty_segments_compile_to_empty_plan() {
        let plan = ExportPlan::compile(&[], &mp4(), true);
        assert!(plan.is_empty());
        assert!(plan.operations().is_empty());
        assert!(plan.to_invocation("in.mp4", "out.mp4").is_none());
        assert_eq!(plan.invocation_count(), 0);
    }

    #[test]
    fn test_single_segment_plan() {
        let plan = ExportPlan::compile(&[Segment::new(2.0, 6.5)], &mp4(), true);
        assert!(matches!(plan, ExportPlan::Single { audio: true, .. }));
        assert_eq!(plan.operations().len(), 3);

        let inv = plan.to_invocation("input.mp4", "output.mp4").unwrap();
        assert!((inv.expected_duration_secs - 4.5).abs() < 1e-9);
        assert_eq!(arg_after(&inv.args, "-ss"), Some("2.000000"));
        assert_eq!(arg_after(&inv.args, "-t"), Some("4.500000"));
        assert_eq!(
            arg_after(&inv.args, "-filter_complex"),
            Some(
                "[0:v]scale=1280:720:force_original_aspect_ratio=decrease,\
                 pad=1280:720:(ow-iw)/2:(oh-ih)/2,setsar=1,fps=30[vout]"
            )
        );
        assert!(inv.args.windows(2).any(|w| w == ["-map", "0:a:0"]));
        assert_eq!(arg_after(&inv.args, "-crf"), Some("23"));
        assert_eq!(inv.args.last().map(String::as_str), Some("output.mp4"));
    }

    #[test]
    fn test_multi_segment_plan_concatenates() {
        let segments = [
            Segment::new(0.0, 2.0),
            Segment::new(3.0, 5.0),
            Segment::new(7.0, 10.0),
        ];
        let plan = ExportPlan::compile(&segments, &mp4(), true);
        let ops = plan.operations();
        assert_eq!(ops.len(), 6);
        assert_eq!(
            ops[3],
            Operation::Concat {
                inputs: 3,
                audio: true
            }
        );

        let inv = plan.to_invocation("input.mp4", "output.mp4").unwrap();
        assert_eq!(inv.args.iter().filter(|a| *a == "-i").count(), 3);
        let graph = arg_after(&inv.args, "-filter_complex").unwrap();
        assert!(graph.starts_with("[0:v][0:a][1:v][1:a][2:v][2:a]concat=n=3:v=1:a=1[cv][ca];[cv]"));
        assert!(inv.args.windows(2).any(|w| w == ["-map", "[ca]"]));
        assert!((inv.expected_duration_secs - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_source_without_audio_drops_audio() {
        let segments = [Segment::new(0.0, 1.0), Segment::new(2.0, 3.0)];
        let inv = ExportPlan::compile(&segments, &mp4(), false)
            .to_invocation("in.mp4", "out.mp4")
            .unwrap();
        let graph = arg_after(&inv.args, "-filter_complex").unwrap();
        assert!(graph.starts_with("[0:v][1:v]concat=n=2:v=1:a=0[cv];"));
        assert!(inv.args.iter().any(|a| a == "-an"));
        assert!(!inv.args.iter().any(|a| a == "-c:a"));
    }

    #[test]
    fn test_gif_plan_uses_palette_and_no_audio() {
        let plan = ExportPlan::compile(&[Segment::new(1.0, 4.0)], &gif(), true);
        assert_eq!(plan.format(), ExportFormat::Gif);

        let inv = plan.to_invocation("in.mp4", "out.gif").unwrap();
        let graph = arg_after(&inv.args, "-filter_complex").unwrap();
        assert_eq!(
            graph,
            "[0:v]fps=15,scale=480:-1:flags=lanczos,split[s0][s1];\
             [s0]palettegen=stats_mode=diff[p];[s1][p]paletteuse[vout]"
        );
        assert!(inv.args.iter().any(|a| a == "-an"));
        assert!(!inv.args.iter().any(|a| a == "libx264"));
    }

    #[test]
    fn test_degenerate_segments_are_dropped() {
        let plan = ExportPlan::compile(
            &[Segment::new(1.0, 1.0), Segment::new(2.0, 3.0)],
            &mp4(),
            false,
        );
        assert!(matches!(plan, ExportPlan::Single { .. }));
    }

    #[test]
    fn test_sub_frame_sliver_between_cuts_is_dropped() {
        let mut model = keepcut_edit_model::CutListModel::new(10.0).unwrap();
        model.add_manual_cut(0.0, 5.0).unwrap();
        model.add_manual_cut(5.0004, 10.0).unwrap();
        let segments = model.compute_keep_segments();
        assert_eq!(segments.len(), 1);

        let plan = ExportPlan::compile(&segments, &mp4(), true);
        assert!(plan.is_empty());
        assert!(plan.to_invocation("in.mp4", "out.mp4").is_none());
    }

    #[test]
    fn test_sliver_dropped_next_to_real_segment() {
        let segments = [Segment::new(1.0, 1.0004), Segment::new(2.0, 3.0)];
        let plan = ExportPlan::compile(&segments, &mp4(), false);
        assert_eq!(plan.segments(), &[Segment::new(2.0, 3.0)]);

        let inv = plan.to_invocation("in.mp4", "out.mp4").unwrap();
        assert_eq!(arg_after(&inv.args, "-ss"), Some("2.000000"));
        assert_eq!(arg_after(&inv.args, "-t"), Some("1.000000"));
    }

    #[test]
    fn test_short_segment_keeps_full_precision() {
        let plan = ExportPlan::compile(&[Segment::new(0.25, 0.3004)], &mp4(), false);
        let inv = plan.to_invocation("in.mp4", "out.mp4").unwrap();
        assert_eq!(arg_after(&inv.args, "-ss"), Some("0.250000"));
        assert_eq!(arg_after(&inv.args, "-t"), Some("0.050400"));
    }

    #[test]
    fn test_unsorted_overlapping_segments_are_normalized() {
        let segments = [
            Segment::new(6.0, 8.0),
            Segment::new(0.0, 2.0),
            Segment::new(1.5, 3.0),
        ];
        let plan = ExportPlan::compile(&segments, &mp4(), true);
        assert_eq!(
            plan.segments(),
            &[Segment::new(0.0, 3.0), Segment::new(6.0, 8.0)]
        );
        assert!((plan.output_duration() - 5.0).abs() < 1e-9);

        let inv = plan.to_invocation("in.mp4", "out.mp4").unwrap();
        assert_eq!(inv.args.iter().filter(|a| *a == "-i").count(), 2);
        assert_eq!(arg_after(&inv.args, "-ss"), Some("0.000000"));
    }
}
