use haar_detector::image::ImageU8;
use haar_detector::{Cascade, DetectorParams, HaarDetector};

// Two-stage 20x20 toy cascade firing on windows whose lower half is brighter
// than the whole.
const DEMO_CASCADE: &str = r#"{
    "window": { "width": 20, "height": 20 },
    "stages": [
        {
            "threshold": 0.0,
            "classifiers": [{
                "nodes": [{
                    "rects": [
                        { "x": 0, "y": 0, "width": 20, "height": 20, "weight": -1.0 },
                        { "x": 0, "y": 10, "width": 20, "height": 10, "weight": 2.0 }
                    ],
                    "threshold": 0.1, "left": 0, "right": -1
                }],
                "alpha": [-1.0, 1.0]
            }]
        },
        {
            "threshold": 0.5,
            "classifiers": [{
                "nodes": [
                    {
                        "rects": [
                            { "x": 0, "y": 0, "width": 20, "height": 20, "weight": -1.0 },
                            { "x": 0, "y": 10, "width": 20, "height": 10, "weight": 2.0 }
                        ],
                        "threshold": 0.1, "left": 0, "right": 1
                    },
                    {
                        "rects": [
                            { "x": 0, "y": 0, "width": 20, "height": 20, "weight": -1.0 },
                            { "x": 10, "y": 0, "width": 10, "height": 20, "weight": 2.0 }
                        ],
                        "threshold": 0.5, "left": -1, "right": -2
                    }
                ],
                "alpha": [-1.0, 1.0, 0.5]
            }]
        }
    ]
}"#;

fn main() {
    // Demo: synthetic frame with one bright block, toy cascade, default params
    let (w, h) = (160usize, 120usize);
    let mut gray = vec![0u8; w * h];
    for y in 60..80 {
        gray[y * w + 70..y * w + 110].fill(220);
    }

    let cascade = match Cascade::from_json_str(DEMO_CASCADE) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    let img = match ImageU8::new(w, h, &gray) {
        Ok(img) => img,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    let mut det = HaarDetector::new(cascade, DetectorParams::default());
    match det.detect_with_diagnostics(&img) {
        Ok(report) => {
            for d in &report.detections {
                println!(
                    "bbox=({}, {}, {}x{}) neighbors={} confidence={:.3}",
                    d.bbox.x, d.bbox.y, d.bbox.width, d.bbox.height, d.neighbors, d.confidence
                );
            }
            println!(
                "detections={} windows={} latency_ms={:.3}",
                report.detections.len(),
                report.trace.scan.windows_evaluated,
                report.trace.timings.total_ms
            );
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
