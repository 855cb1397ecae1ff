use crate::scan::{ScaleStats, ScanOutput};
use serde::Serialize;

/// Scale-space scan summary.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStage {
    pub elapsed_ms: f64,
    pub scales: Vec<ScaleStats>,
    pub windows_evaluated: u64,
    pub raw_detections: usize,
    /// Rejections per stage summed over all scales.
    pub rejected_per_stage: Vec<u64>,
}

impl ScanStage {
    pub fn from_output(output: &ScanOutput, elapsed_ms: f64) -> Self {
        let stage_count = output
            .scales
            .iter()
            .map(|s| s.rejected_per_stage.len())
            .max()
            .unwrap_or(0);
        let mut rejected_per_stage = vec![0u64; stage_count];
        for stats in &output.scales {
            for (total, n) in rejected_per_stage.iter_mut().zip(&stats.rejected_per_stage) {
                *total += n;
            }
        }
        Self {
            elapsed_ms,
            scales: output.scales.clone(),
            windows_evaluated: output.windows_evaluated(),
            raw_detections: output.detections.len(),
            rejected_per_stage,
        }
    }
}
