mod common;

use common::cascades::bottom_edge_cascade;
use common::synthetic_image::{bright_block_u8, noise_u8, uniform_u8};
use haar_detector::image::ImageU8;
use haar_detector::{detect, DetectorParams, Error, HaarDetector, InvalidInputError};
use std::sync::Arc;

#[test]
fn mid_gray_frame_yields_nothing() {
    let _ = env_logger::builder().is_test(true).try_init();
    let buffer = uniform_u8(40, 40, 128);
    let image = ImageU8::new(40, 40, &buffer).unwrap();

    let mut detector = HaarDetector::new(bottom_edge_cascade(), DetectorParams::default());
    let report = detector.detect_with_diagnostics(&image).unwrap();

    assert!(report.detections.is_empty());
    let scan = &report.trace.scan;
    assert!(scan.windows_evaluated > 0);
    assert_eq!(scan.raw_detections, 0);
    // every window stops at the first stage
    assert_eq!(scan.rejected_per_stage, vec![scan.windows_evaluated, 0]);
    for stats in &scan.scales {
        assert_eq!(stats.rejected_per_stage[0], stats.windows, "scale {}", stats.scale);
    }
}

#[test]
fn bright_bottom_edge_is_detected() {
    let _ = env_logger::builder().is_test(true).try_init();
    // the bottom half of a 20×20 region at (30, 30) is bright
    let buffer = bright_block_u8(80, 80, (30, 40, 20, 10), 200);
    let image = ImageU8::new(80, 80, &buffer).unwrap();

    let detections = detect(&image, &bottom_edge_cascade(), 1.1, 0.1, 3).unwrap();
    assert!(!detections.is_empty(), "expected at least one detection");
    let closest = detections
        .iter()
        .map(|d| {
            let (cx, cy) = d.bbox.center();
            ((cx - 40.0).powi(2) + (cy - 40.0).powi(2)).sqrt()
        })
        .fold(f32::INFINITY, f32::min);
    assert!(closest <= 10.0, "closest detection centre is {closest:.1}px away");
    assert!(detections.iter().all(|d| d.neighbors >= 3));
    assert!(detections.iter().all(|d| d.confidence >= 0.5));
}

#[test]
fn detection_is_idempotent() {
    let buffer = noise_u8(96, 72, 11);
    let image = ImageU8::new(96, 72, &buffer).unwrap();
    let cascade = bottom_edge_cascade();

    let first = detect(&image, &cascade, 1.1, 0.1, 2).unwrap();
    let second = detect(&image, &cascade, 1.1, 0.1, 2).unwrap();
    assert_eq!(first, second);

    let mut detector = HaarDetector::new(cascade, DetectorParams::new(1.1, 0.1, 2));
    assert_eq!(detector.detect(&image).unwrap(), first);
    assert_eq!(detector.detect(&image).unwrap(), first);
}

#[test]
fn frame_equal_to_window_scans_one_scale() {
    let buffer = uniform_u8(20, 20, 77);
    let image = ImageU8::new(20, 20, &buffer).unwrap();
    let params = DetectorParams::new(1.2, 0.1, 3);

    let mut detector = HaarDetector::new(bottom_edge_cascade(), params);
    let report = detector.detect_with_diagnostics(&image).unwrap();
    assert_eq!(report.trace.scan.scales.len(), 1);
    assert_eq!(report.trace.scan.scales[0].scale, 1.0);
    assert_eq!(report.trace.scan.windows_evaluated, 1);
}

#[test]
fn fine_scale_factor_does_not_inflate_neighbors() {
    let buffer = bright_block_u8(20, 20, (0, 10, 20, 10), 200);
    let image = ImageU8::new(20, 20, &buffer).unwrap();

    let params = DetectorParams::new(1.01, 0.1, 3);
    let mut detector = HaarDetector::new(bottom_edge_cascade(), params);
    let report = detector.detect_with_diagnostics(&image).unwrap();
    assert_eq!(report.trace.scan.scales.len(), 1);
    assert_eq!(report.trace.scan.raw_detections, 1);
    assert!(report.detections.is_empty());

    let single = detect(&image, &bottom_edge_cascade(), 1.01, 0.1, 1).unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].neighbors, 1);
}

#[test]
fn frame_smaller_than_window_is_not_an_error() {
    let buffer = uniform_u8(12, 30, 10);
    let image = ImageU8::new(12, 30, &buffer).unwrap();
    let detections = detect(&image, &bottom_edge_cascade(), 1.1, 0.1, 3).unwrap();
    assert!(detections.is_empty());
}

#[test]
fn empty_frame_is_invalid_input() {
    let image = ImageU8 {
        w: 0,
        h: 10,
        stride: 0,
        data: &[],
    };
    let err = detect(&image, &bottom_edge_cascade(), 1.1, 0.1, 3).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput(InvalidInputError::EmptyImage { width: 0, height: 10 })
    ));
}

#[test]
fn shared_cascade_across_threads() {
    let cascade = Arc::new(bottom_edge_cascade());
    let buffer = bright_block_u8(64, 64, (20, 30, 20, 10), 180);
    let expected = {
        let image = ImageU8::new(64, 64, &buffer).unwrap();
        detect(&image, &cascade, 1.1, 0.1, 3).unwrap()
    };

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let cascade = Arc::clone(&cascade);
                let buffer = &buffer;
                s.spawn(move || {
                    let image = ImageU8::new(64, 64, buffer).unwrap();
                    let mut detector = HaarDetector::new(cascade, DetectorParams::default());
                    detector.detect(&image).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
