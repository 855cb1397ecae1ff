use crate::error::InvalidInputError;
use serde::{Deserialize, Serialize};

/// Options controlling the scale-space scan.
///
/// - `scale_factor`: ratio between consecutive scales, strictly above 1.
/// - `step_fraction`: window step as a fraction of the scaled canonical width.
/// - `min_window` / `max_window`: optional bounds on the scaled window width in
///   pixels; scales outside them are skipped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanParams {
    pub scale_factor: f32,
    pub step_fraction: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_window: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_window: Option<u32>,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.1,
            step_fraction: 0.1,
            min_window: None,
            max_window: None,
        }
    }
}

impl ScanParams {
    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_step_fraction(mut self, step_fraction: f32) -> Self {
        self.step_fraction = step_fraction;
        self
    }

    pub fn with_window_bounds(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_window = min;
        self.max_window = max;
        self
    }

    pub fn validate(&self) -> Result<(), InvalidInputError> {
        if !(self.scale_factor.is_finite() && self.scale_factor > 1.0) {
            return Err(InvalidInputError::InvalidParameter {
                name: "scale_factor",
                reason: format!("{} must be a finite value above 1", self.scale_factor),
            });
        }
        if !(self.step_fraction.is_finite() && self.step_fraction > 0.0) {
            return Err(InvalidInputError::InvalidParameter {
                name: "step_fraction",
                reason: format!("{} must be a finite positive value", self.step_fraction),
            });
        }
        if let (Some(min), Some(max)) = (self.min_window, self.max_window) {
            if min > max {
                return Err(InvalidInputError::InvalidParameter {
                    name: "min_window",
                    reason: format!("{min} exceeds max_window {max}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_values() {
        assert!(ScanParams::default().validate().is_ok());
        assert!(ScanParams::default().with_scale_factor(1.0).validate().is_err());
        assert!(ScanParams::default().with_scale_factor(f32::NAN).validate().is_err());
        assert!(ScanParams::default().with_step_fraction(0.0).validate().is_err());
        assert!(ScanParams::default()
            .with_window_bounds(Some(40), Some(30))
            .validate()
            .is_err());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let params: ScanParams = serde_json::from_str(r#"{ "scale_factor": 1.25 }"#).unwrap();
        assert_eq!(params.scale_factor, 1.25);
        assert_eq!(params.step_fraction, 0.1);
        assert_eq!(params.min_window, None);
    }
}
