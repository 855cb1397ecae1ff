use haar_detector::config::detect::{self, load_cascade_file};
use haar_detector::image::io::{load_grayscale_image, save_detections_overlay, write_json_file};
use haar_detector::{init_thread_pool, DetectionReport, HaarDetector};
use log::info;
use std::env;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "haar_detect".to_string());
    let config = detect::parse_cli(&program)?;
    init_thread_pool(config.threads)?;

    let cascade = load_cascade_file(&config.cascade)?;
    info!(
        "loaded cascade {}: {} stages, window {}x{}",
        config.cascade.display(),
        cascade.stage_count(),
        cascade.window().width,
        cascade.window().height
    );

    let gray = load_grayscale_image(&config.input)?;
    let mut detector = HaarDetector::new(cascade, config.params);
    let report = detector
        .detect_with_diagnostics(&gray.as_view())
        .map_err(|e| e.to_string())?;

    print_text_summary(&report);

    if let Some(path) = &config.output.json_out {
        write_json_file(path, &report)?;
        println!("JSON report written to {}", path.display());
    }
    if let Some(path) = &config.output.overlay_out {
        save_detections_overlay(&gray, &report.detections, path)?;
        println!("Overlay written to {}", path.display());
    }
    Ok(())
}

fn print_text_summary(report: &DetectionReport) {
    let trace = &report.trace;
    println!("Detection summary");
    println!("  input: {}x{}", trace.input.width, trace.input.height);
    println!(
        "  scales: {}  windows: {}  raw hits: {}",
        trace.scan.scales.len(),
        trace.scan.windows_evaluated,
        trace.scan.raw_detections
    );
    println!("  detections: {}", report.detections.len());
    for det in &report.detections {
        let b = &det.bbox;
        println!(
            "    [{} {} {}x{}] neighbors={} confidence={:.3}",
            b.x, b.y, b.width, b.height, det.neighbors, det.confidence
        );
    }
    println!("  timings (ms):");
    for stage in &trace.timings.stages {
        println!("    {:<10} {:>9.3}", stage.label, stage.elapsed_ms);
    }
    println!("    {:<10} {:>9.3}", "total", trace.timings.total_ms);
}
