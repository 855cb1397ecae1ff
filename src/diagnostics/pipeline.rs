use crate::cascade::CascadeSummary;
use crate::diagnostics::{MergeStage, ScanStage, TimingBreakdown};
use crate::types::Detection;
use serde::Serialize;

/// Result produced by
/// [`HaarDetector::detect_with_diagnostics`](crate::HaarDetector::detect_with_diagnostics).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub detections: Vec<Detection>,
    pub trace: PipelineTrace,
}

/// End-to-end trace of one detection call.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub input: InputDescriptor,
    pub cascade: CascadeSummary,
    pub timings: TimingBreakdown,
    pub scan: ScanStage,
    pub merge: MergeStage,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub stride: usize,
}
