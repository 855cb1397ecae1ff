//! Parameter types configuring a detection call.
//!
//! [`DetectorParams`] groups the scan and grouping knobs. Every field has a
//! serde default, so a JSON configuration only needs to list the values it
//! changes. Defaults follow common face-detection practice: 10 % scale
//! growth, a step of a tenth of the window and three neighbours per group.

use crate::error::InvalidInputError;
use crate::merge::MergeParams;
use crate::scan::ScanParams;
use serde::{Deserialize, Serialize};

/// Detector-wide parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Scale-space scan.
    pub scan: ScanParams,
    /// Grouping of accepted windows.
    pub merge: MergeParams,
}

impl DetectorParams {
    /// Parameters of the positional [`detect`](crate::detect) entry point.
    pub fn new(scale_factor: f32, step_fraction: f32, min_neighbors: usize) -> Self {
        Self {
            scan: ScanParams::default()
                .with_scale_factor(scale_factor)
                .with_step_fraction(step_fraction),
            merge: MergeParams {
                min_neighbors,
                ..Default::default()
            },
        }
    }

    pub fn validate(&self) -> Result<(), InvalidInputError> {
        self.scan.validate()?;
        self.merge.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let params: DetectorParams =
            serde_json::from_str(r#"{ "merge": { "min_neighbors": 1 } }"#).unwrap();
        assert_eq!(params.merge.min_neighbors, 1);
        assert_eq!(params.merge.eps, 0.2);
        assert_eq!(params.scan, ScanParams::default());
    }

    #[test]
    fn validate_reports_offending_field() {
        let params = DetectorParams::new(1.0, 0.1, 3);
        match params.validate() {
            Err(InvalidInputError::InvalidParameter { name, .. }) => {
                assert_eq!(name, "scale_factor")
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(DetectorParams::new(1.2, 0.05, 0).validate().is_ok());
    }
}
