//! # keepcut-export
//!
//! Turns keep segments into an encoded MP4 or GIF.
//!
//! - **Settings**: output format, resolution, frame rate
//! - **Plan**: pure, tagged description of the ffmpeg work
//! - **Engine**: async port for running plans, with an ffmpeg implementation
//! - **Compiler**: single-flight export pipeline with monotonic progress

pub mod compiler;
pub mod empty;
pub mod engine;
pub mod ffmpeg;
pub mod plan;
pub mod progress;
pub mod settings;

pub use compiler::{ExportCompiler, ExportOutput, ExportRequest, ExportSource};
pub use empty::empty_output;
pub use engine::{EngineEvents, MediaEngine};
pub use ffmpeg::{probe_media, FfmpegEngine, MediaInfo};
pub use plan::{Encode, ExportPlan, Invocation, Operation, VideoFilter};
pub use progress::{ProgressCallback, ProgressTracker};
pub use settings::{ExportFormat, ExportSettings, FrameRate, PaletteStatsMode, Resolution};
