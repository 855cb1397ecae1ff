//! Diagnostics data model returned next to the detections.
//!
//! `DetectionReport` is the entry point: the merged detections plus a
//! `PipelineTrace` with the input geometry, cascade summary, phase timings,
//! per-scale scan statistics and the grouping summary.

pub mod merge;
pub mod pipeline;
pub mod scan;
pub mod timing;

pub use merge::MergeStage;
pub use pipeline::{DetectionReport, InputDescriptor, PipelineTrace};
pub use scan::ScanStage;
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
