//! Keepcut Timeline
//!
//! The interactive editing surface over a [`CutListModel`]:
//! - **Drag:** Trim handle hit-testing and the drag state machine
//! - **Playback:** Keeps a video player inside the trim window and skips cuts
//! - **Waveform:** Peak amplitudes for drawing
//! - **Frame:** Deterministic display list of the timeline
//! - **Controller:** Routes pointer, playback, and edit events, redrawing after each
//!
//! No rendering backend is assumed; [`frame::Frame`] is plain data.
//!
//! [`CutListModel`]: keepcut_edit_model::CutListModel

pub mod controller;
pub mod drag;
pub mod frame;
pub mod playback;
pub mod waveform;

pub use controller::{TimelineConfig, TimelineController, TimelineStatus};
pub use drag::{DragState, PointerDown, TimelineGeometry};
pub use frame::{render_frame, Frame};
pub use playback::{Player, SyncAction};
pub use waveform::Waveform;
