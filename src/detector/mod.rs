//! Haar cascade detector orchestrating one detection call.
//!
//! Modules
//! - [`params`]: configuration types used by the detector and CLI.
//! - `pipeline`: the [`HaarDetector`] implementation and the one-shot
//!   [`detect`] function.
//! - `workspace`: integral-image buffers reused across frames.

pub mod params;
mod pipeline;
mod workspace;

pub use params::DetectorParams;
pub use pipeline::{detect, HaarDetector};
pub use workspace::DetectorWorkspace;
