//! Keepcut Edit Model
//!
//! Defines the non-destructive editing contracts:
//! - **Interval:** Pure interval algebra (merge, clip, subtract)
//! - **Cut:** Regions marked for removal, tagged by origin and enabled flag
//! - **CutList:** Trim window + cuts, projecting the canonical keep segments
//! - **Transcript:** Analyzer output that seeds filler and silence cuts
//! - **Session:** On-disk edit session (`*.keepcut.json`)
//!
//! All times are in seconds relative to the start of the source media.

pub mod cut;
pub mod cut_list;
pub mod error;
pub mod interval;
pub mod session;
pub mod transcript;

pub use cut::*;
pub use cut_list::*;
pub use error::*;
pub use interval::*;
pub use session::*;
pub use transcript::*;
