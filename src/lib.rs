#![doc = include_str!("../README.md")]

// Public modules (stable surface)
pub mod cascade;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod types;

// Building blocks, public for tools and tests.
pub mod config;
pub mod integral;
pub mod merge;
pub mod runtime;
pub mod scan;

// --- High-level re-exports -------------------------------------------------

// Loading and the cascade model.
pub use crate::cascade::{load_cascade, Cascade, CascadeDescription, FeatureNormalization};

// Main entry points: detector + results.
pub use crate::detector::{detect, DetectorParams, DetectorWorkspace, HaarDetector};
pub use crate::types::{BoundingBox, Detection, RawDetection};

// Errors.
pub use crate::error::{Error, InvalidInputError, LoadError, Result};

// High-level diagnostics returned by the detector.
pub use crate::diagnostics::{DetectionReport, PipelineTrace};

pub use crate::merge::MergeParams;
pub use crate::runtime::init_thread_pool;
pub use crate::scan::ScanParams;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use haar_detector::prelude::*;
///
/// # fn main() -> haar_detector::Result<()> {
/// let bytes = std::fs::read("face.cascade").expect("cascade file");
/// let cascade = load_cascade(&bytes)?;
///
/// let (w, h) = (640usize, 480usize);
/// let gray = vec![0u8; w * h];
/// let img = ImageU8::new(w, h, &gray)?;
///
/// let mut det = HaarDetector::new(cascade, DetectorParams::default());
/// for d in det.detect(&img)? {
///     println!("{:?} neighbors={} confidence={:.3}", d.bbox, d.neighbors, d.confidence);
/// }
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::ImageU8;
    pub use crate::{
        detect, load_cascade, BoundingBox, Cascade, Detection, DetectorParams, HaarDetector,
    };
}

// --- Stage-level API (for tools & advanced users) ---------------------------

pub mod stages {
    // Stage runners.
    pub use crate::integral::IntegralImage;
    pub use crate::merge::{group_detections, group_rectangles};
    pub use crate::scan::{scan, ScaleStats, ScanOutput};

    // Per-window evaluation.
    pub use crate::cascade::{
        CascadeState, ScaledCascade, StageCounter, StageObserver, StageOutcome, WindowVerdict,
    };

    // Structured diagnostics types.
    pub use crate::diagnostics::{
        InputDescriptor, MergeStage, ScanStage, StageTiming, TimingBreakdown,
    };
}
