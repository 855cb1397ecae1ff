//! Scale-space sliding-window scan.
//!
//! Scales start at 1.0 and grow geometrically by `scale_factor` while the
//! scaled canonical window still fits the frame. Per scale the cascade
//! geometry is resolved once ([`ScaledCascade`]) and windows are placed on a
//! square grid with step `max(1, round(canonical_width · s · step_fraction))`
//! over every origin whose read extent stays inside the frame.
//!
//! Windows are independent. With the `parallel` feature the rows of one scale
//! are evaluated concurrently; results are collected in row order so the
//! output is identical to the sequential scan (row-major, scales ascending).
mod options;

pub use options::ScanParams;

use crate::cascade::scaled::round_half_up;
use crate::cascade::{Cascade, ScaledCascade, WindowVerdict};
use crate::error::InvalidInputError;
use crate::integral::IntegralImage;
use crate::types::{BoundingBox, RawDetection, Window};
use log::debug;
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Statistics collected for one scanned scale.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleStats {
    pub scale: f32,
    pub window_width: u32,
    pub window_height: u32,
    pub step: u32,
    pub windows: u64,
    pub accepted: u64,
    /// Windows rejected at each stage, indexed by stage.
    pub rejected_per_stage: Vec<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct ScanOutput {
    /// Accepted windows, scales ascending then row-major.
    pub detections: Vec<RawDetection>,
    /// One entry per scale that was actually scanned.
    pub scales: Vec<ScaleStats>,
}

impl ScanOutput {
    pub fn windows_evaluated(&self) -> u64 {
        self.scales.iter().map(|s| s.windows).sum()
    }
}

#[derive(Default)]
struct RowScan {
    accepted: Vec<RawDetection>,
    windows: u64,
    rejected: Vec<u64>,
}

/// Evaluate the cascade on every window of every scale.
pub fn scan(
    integral: &IntegralImage,
    cascade: &Cascade,
    params: &ScanParams,
) -> Result<ScanOutput, InvalidInputError> {
    params.validate()?;
    let img_w = integral.width() as u32;
    let img_h = integral.height() as u32;
    let canonical = cascade.window();
    let mut out = ScanOutput::default();

    let mut scale = 1.0f32;
    let mut last_window = None;
    loop {
        if canonical.width as f32 * scale > img_w as f32
            || canonical.height as f32 * scale > img_h as f32
        {
            break;
        }
        let win_w = round_half_up(canonical.width as f32 * scale);
        let win_h = round_half_up(canonical.height as f32 * scale);
        // Scales rounding to an already scanned window would repeat its hits.
        if last_window == Some((win_w, win_h)) {
            scale *= params.scale_factor;
            continue;
        }
        if params.max_window.is_some_and(|max| win_w > max) {
            debug!("scan: window {win_w}px exceeds max_window, stopping at scale {scale:.3}");
            break;
        }
        if params.min_window.is_some_and(|min| win_w < min) {
            scale *= params.scale_factor;
            continue;
        }

        let scaled = ScaledCascade::new(cascade, scale);
        let (ext_w, ext_h) = scaled.extent();
        if ext_w > img_w || ext_h > img_h {
            debug!("scan: scale {scale:.3} reads {ext_w}x{ext_h} past the frame, skipped");
            scale *= params.scale_factor;
            continue;
        }

        last_window = Some((win_w, win_h));
        let step = round_half_up(canonical.width as f32 * scale * params.step_fraction).max(1);
        let stats = scan_scale(
            &scaled,
            integral,
            step,
            (img_w - ext_w, img_h - ext_h),
            &mut out.detections,
        );
        debug!(
            "scan: scale {:.3} window {}x{} step {} windows {} accepted {}",
            scale, win_w, win_h, step, stats.windows, stats.accepted
        );
        out.scales.push(stats);
        scale *= params.scale_factor;
    }

    debug!(
        "scan: {} scales, {} windows, {} accepted",
        out.scales.len(),
        out.windows_evaluated(),
        out.detections.len()
    );
    Ok(out)
}

fn scan_scale(
    scaled: &ScaledCascade<'_>,
    integral: &IntegralImage,
    step: u32,
    (max_x, max_y): (u32, u32),
    detections: &mut Vec<RawDetection>,
) -> ScaleStats {
    let step_px = step as usize;
    let rows: Vec<usize> = (0..=max_y as usize).step_by(step_px).collect();
    let run_row = |&y: &usize| scan_row(scaled, integral, y, max_x as usize, step_px);

    #[cfg(feature = "parallel")]
    let results: Vec<RowScan> = rows.par_iter().map(run_row).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<RowScan> = rows.iter().map(run_row).collect();

    let (win_w, win_h) = scaled.window();
    let mut stats = ScaleStats {
        scale: scaled.scale(),
        window_width: win_w,
        window_height: win_h,
        step,
        rejected_per_stage: vec![0; scaled.stages().len()],
        ..Default::default()
    };
    for row in results {
        stats.windows += row.windows;
        stats.accepted += row.accepted.len() as u64;
        for (total, n) in stats.rejected_per_stage.iter_mut().zip(&row.rejected) {
            *total += n;
        }
        detections.extend(row.accepted);
    }
    stats
}

fn scan_row(
    scaled: &ScaledCascade<'_>,
    integral: &IntegralImage,
    y: usize,
    max_x: usize,
    step: usize,
) -> RowScan {
    let (win_w, win_h) = scaled.window();
    let mut row = RowScan {
        rejected: vec![0; scaled.stages().len()],
        ..Default::default()
    };
    for x in (0..=max_x).step_by(step) {
        row.windows += 1;
        match scaled.evaluate_window(integral, x, y) {
            WindowVerdict::Accepted { score } => row.accepted.push(RawDetection {
                window: Window {
                    x: x as u32,
                    y: y as u32,
                    scale: scaled.scale(),
                },
                bbox: BoundingBox::new(x as i32, y as i32, win_w as i32, win_h as i32),
                score,
            }),
            WindowVerdict::Rejected { stage, .. } => row.rejected[stage] += 1,
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::test_utils::two_stage_description;
    use crate::image::ImageU8;

    fn integral_of(w: usize, h: usize, data: &[u8]) -> IntegralImage {
        IntegralImage::build(&ImageU8::new(w, h, data).unwrap()).unwrap()
    }

    #[test]
    fn frame_smaller_than_window_yields_nothing() {
        let cascade = two_stage_description().build().unwrap();
        let data = vec![0u8; 19 * 40];
        let out = scan(&integral_of(19, 40, &data), &cascade, &ScanParams::default()).unwrap();
        assert!(out.detections.is_empty());
        assert!(out.scales.is_empty());
    }

    #[test]
    fn scale_sequence_and_steps() {
        let cascade = two_stage_description().build().unwrap();
        let data = vec![128u8; 48 * 30];
        let params = ScanParams::default().with_scale_factor(1.25);
        let out = scan(&integral_of(48, 30, &data), &cascade, &params).unwrap();
        // 20 and 25 fit the 30 px height, 31.25 does not
        let sizes: Vec<u32> = out.scales.iter().map(|s| s.window_width).collect();
        assert_eq!(sizes, vec![20, 25]);
        assert_eq!(out.scales[0].step, 2);
        // x in 0..=28 step 2, y in 0..=10 step 2
        assert_eq!(out.scales[0].windows, 15 * 6);
        // scale 1.25 reads one row past the window (rounded rect ends at 26)
        assert_eq!(out.scales[1].step, 3);
        assert_eq!(out.scales[1].windows, 8 * 2);
    }

    #[test]
    fn window_bounds_skip_scales() {
        let cascade = two_stage_description().build().unwrap();
        let data = vec![128u8; 64 * 64];
        let params = ScanParams::default()
            .with_scale_factor(1.5)
            .with_window_bounds(Some(25), Some(45));
        let out = scan(&integral_of(64, 64, &data), &cascade, &params).unwrap();
        let sizes: Vec<u32> = out.scales.iter().map(|s| s.window_width).collect();
        assert_eq!(sizes, vec![30, 45]);
    }

    #[test]
    fn fine_scale_factor_scans_each_window_size_once() {
        let cascade = two_stage_description().build().unwrap();
        let data = vec![128u8; 20 * 20];
        let params = ScanParams::default().with_scale_factor(1.01);
        let out = scan(&integral_of(20, 20, &data), &cascade, &params).unwrap();
        let scales: Vec<f32> = out.scales.iter().map(|s| s.scale).collect();
        assert_eq!(scales, vec![1.0]);

        let data = vec![128u8; 40 * 40];
        let out = scan(&integral_of(40, 40, &data), &cascade, &params).unwrap();
        let sizes: Vec<u32> = out.scales.iter().map(|s| s.window_width).collect();
        assert_eq!(sizes[..2], [20, 21]);
        assert!(sizes.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn single_hit_is_not_repeated_across_close_scales() {
        let cascade = two_stage_description().build().unwrap();
        let mut data = vec![0u8; 20 * 20];
        data[200..].fill(200);
        let params = ScanParams::default().with_scale_factor(1.01);
        let out = scan(&integral_of(20, 20, &data), &cascade, &params).unwrap();
        assert_eq!(out.detections.len(), 1);
    }

    #[test]
    fn rejects_invalid_params() {
        let cascade = two_stage_description().build().unwrap();
        let data = vec![0u8; 20 * 20];
        let params = ScanParams::default().with_scale_factor(0.9);
        assert!(scan(&integral_of(20, 20, &data), &cascade, &params).is_err());
    }

    #[test]
    fn accepted_windows_carry_scale_and_box() {
        let cascade = two_stage_description().build().unwrap();
        let mut data = vec![0u8; 20 * 20];
        data[200..].fill(200);
        let out = scan(&integral_of(20, 20, &data), &cascade, &ScanParams::default()).unwrap();
        assert_eq!(out.detections.len(), 1);
        let det = out.detections[0];
        assert_eq!(det.bbox, BoundingBox::new(0, 0, 20, 20));
        assert_eq!(det.window.scale, 1.0);
        assert_eq!(det.score, 1.0);
    }
}
