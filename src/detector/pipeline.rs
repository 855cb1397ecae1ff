//! Detector pipeline driving a detection call end-to-end.
//!
//! Integral image → scale-space scan (cascade evaluation per window) →
//! grouping. [`HaarDetector`] owns a shared cascade, its parameters and a
//! workspace reused across frames.
//!
//! Typical usage:
//! ```no_run
//! use haar_detector::{load_cascade, DetectorParams, HaarDetector};
//! use haar_detector::image::ImageU8;
//!
//! # fn example(bytes: &[u8], gray: ImageU8) -> haar_detector::Result<()> {
//! let cascade = load_cascade(bytes)?;
//! let mut detector = HaarDetector::new(cascade, DetectorParams::default());
//! let report = detector.detect_with_diagnostics(&gray)?;
//! for det in &report.detections {
//!     println!("{:?} neighbors={}", det.bbox, det.neighbors);
//! }
//! # Ok(())
//! # }
//! ```
use super::params::DetectorParams;
use super::workspace::DetectorWorkspace;
use crate::cascade::Cascade;
use crate::diagnostics::{
    elapsed_ms, DetectionReport, InputDescriptor, MergeStage, PipelineTrace, ScanStage,
    TimingBreakdown,
};
use crate::error::Result;
use crate::image::ImageU8;
use crate::merge::group_detections;
use crate::scan::scan;
use crate::types::Detection;
use log::debug;
use std::sync::Arc;
use std::time::Instant;

/// Haar cascade detector bound to one cascade.
pub struct HaarDetector {
    cascade: Arc<Cascade>,
    params: DetectorParams,
    workspace: DetectorWorkspace,
}

impl HaarDetector {
    /// Create a detector. The cascade may be shared with other detectors
    /// through an `Arc`.
    pub fn new(cascade: impl Into<Arc<Cascade>>, params: DetectorParams) -> Self {
        Self {
            cascade: cascade.into(),
            params,
            workspace: DetectorWorkspace::new(),
        }
    }

    pub fn cascade(&self) -> &Cascade {
        &self.cascade
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    pub fn set_params(&mut self, params: DetectorParams) {
        self.params = params;
    }

    /// Detect objects in a single-channel frame.
    pub fn detect(&mut self, image: &ImageU8<'_>) -> Result<Vec<Detection>> {
        Ok(self.detect_with_diagnostics(image)?.detections)
    }

    /// Detect objects and return the per-phase trace alongside.
    pub fn detect_with_diagnostics(&mut self, image: &ImageU8<'_>) -> Result<DetectionReport> {
        run_detection(&self.cascade, &self.params, &mut self.workspace, image)
    }
}

/// One-shot detection with positional parameters and a fresh workspace.
pub fn detect(
    image: &ImageU8<'_>,
    cascade: &Cascade,
    scale_factor: f32,
    step_fraction: f32,
    min_neighbors: usize,
) -> Result<Vec<Detection>> {
    let params = DetectorParams::new(scale_factor, step_fraction, min_neighbors);
    let mut workspace = DetectorWorkspace::new();
    Ok(run_detection(cascade, &params, &mut workspace, image)?.detections)
}

fn run_detection(
    cascade: &Cascade,
    params: &DetectorParams,
    workspace: &mut DetectorWorkspace,
    image: &ImageU8<'_>,
) -> Result<DetectionReport> {
    params.validate()?;
    debug!(
        "HaarDetector::detect start w={} h={} window={}x{} stages={}",
        image.w,
        image.h,
        cascade.window().width,
        cascade.window().height,
        cascade.stage_count()
    );
    let total_start = Instant::now();
    let mut timings = TimingBreakdown::default();

    let integral_start = Instant::now();
    let integral = workspace.integral_for(image)?;
    timings.push("integral", elapsed_ms(integral_start));

    let scan_start = Instant::now();
    let scanned = scan(integral, cascade, &params.scan)?;
    let scan_ms = elapsed_ms(scan_start);
    timings.push("scan", scan_ms);

    let merge_start = Instant::now();
    let detections = group_detections(&scanned.detections, &params.merge);
    let merge_ms = elapsed_ms(merge_start);
    timings.push("merge", merge_ms);
    timings.total_ms = elapsed_ms(total_start);

    debug!(
        "HaarDetector::detect done scales={} windows={} raw={} detections={} total_ms={:.3}",
        scanned.scales.len(),
        scanned.windows_evaluated(),
        scanned.detections.len(),
        detections.len(),
        timings.total_ms
    );

    let trace = PipelineTrace {
        input: InputDescriptor {
            width: image.w,
            height: image.h,
            stride: image.stride,
        },
        cascade: cascade.summary(),
        timings,
        scan: ScanStage::from_output(&scanned, scan_ms),
        merge: MergeStage {
            elapsed_ms: merge_ms,
            params: params.merge,
            raw_windows: scanned.detections.len(),
            detections: detections.len(),
        },
    };
    Ok(DetectionReport { detections, trace })
}
