use crate::cascade::{load_cascade, Cascade};
use crate::detector::DetectorParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Pretty-printed [`DetectionReport`](crate::DetectionReport).
    pub json_out: Option<PathBuf>,
    /// Copy of the input with detection outlines drawn in.
    pub overlay_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DetectToolConfig {
    pub input: PathBuf,
    pub cascade: PathBuf,
    #[serde(default)]
    pub params: DetectorParams,
    /// Worker threads; falls back to `HAAR_CPU_THREADS`, then all cores.
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub output: OutputConfig,
}

pub fn load_config(path: &Path) -> Result<DetectToolConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: DetectToolConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}

/// Read the single config path from the command line.
pub fn parse_cli(program: &str) -> Result<DetectToolConfig, String> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| format!("Usage: {program} <config.json>"))?;
    if args.next().is_some() {
        return Err(format!("Usage: {program} <config.json>"));
    }
    load_config(Path::new(&path))
}

/// Load a cascade file; `.json` selects the table form, anything else the
/// binary format.
pub fn load_cascade_file(path: &Path) -> Result<Cascade, String> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let loaded = if is_json {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cascade {}: {e}", path.display()))?;
        Cascade::from_json_str(&text)
    } else {
        let bytes = fs::read(path)
            .map_err(|e| format!("Failed to read cascade {}: {e}", path.display()))?;
        load_cascade(&bytes)
    };
    loaded.map_err(|e| format!("Failed to load cascade {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: DetectToolConfig =
            serde_json::from_str(r#"{ "input": "frame.png", "cascade": "face.bin" }"#).unwrap();
        assert_eq!(config.params, DetectorParams::default());
        assert!(config.output.json_out.is_none());
        assert!(config.threads.is_none());
    }

    #[test]
    fn nested_params_override_fields() {
        let config: DetectToolConfig = serde_json::from_str(
            r#"{
                "input": "frame.png",
                "cascade": "face.json",
                "params": { "scan": { "scale_factor": 1.2, "min_window": 40 } },
                "output": { "json_out": "out/report.json" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.params.scan.scale_factor, 1.2);
        assert_eq!(config.params.scan.min_window, Some(40));
        assert_eq!(config.params.merge.min_neighbors, 3);
        assert_eq!(config.output.json_out, Some(PathBuf::from("out/report.json")));
    }
}
