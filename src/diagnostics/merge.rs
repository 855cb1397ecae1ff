use crate::merge::MergeParams;
use serde::Serialize;

/// Detection grouping summary.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStage {
    pub elapsed_ms: f64,
    pub params: MergeParams,
    pub raw_windows: usize,
    pub detections: usize,
}
