use haar_detector::image::io::ensure_parent_dir;
use haar_detector::Cascade;
use log::info;
use std::env;
use std::fs;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("cascade_convert");
    let [_, input, output] = args.as_slice() else {
        return Err(format!("Usage: {program} <cascade.json> <cascade.bin>"));
    };

    let text = fs::read_to_string(input).map_err(|e| format!("Failed to read {input}: {e}"))?;
    let cascade = Cascade::from_json_str(&text).map_err(|e| format!("{input}: {e}"))?;
    let bytes = cascade.to_bytes();

    ensure_parent_dir(Path::new(output))?;
    fs::write(output, &bytes).map_err(|e| format!("Failed to write {output}: {e}"))?;
    info!(
        "{} stages, {} weak classifiers, {} nodes -> {} bytes",
        cascade.stage_count(),
        cascade.classifier_count(),
        cascade.node_count(),
        bytes.len()
    );
    println!("Binary cascade written to {output}");
    Ok(())
}
