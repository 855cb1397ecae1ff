//! Reusable per-detector buffers.
//!
//! The integral tables are the only per-frame allocation proportional to the
//! image size. Keeping them in the workspace lets consecutive frames of the
//! same size run without reallocating.
use crate::error::InvalidInputError;
use crate::image::ImageU8;
use crate::integral::IntegralImage;

#[derive(Debug, Default)]
pub struct DetectorWorkspace {
    integral: IntegralImage,
    frames: u64,
}

impl DetectorWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the integral tables for `image` and borrow them for the scan.
    pub fn integral_for(
        &mut self,
        image: &ImageU8<'_>,
    ) -> Result<&IntegralImage, InvalidInputError> {
        self.integral.rebuild(image)?;
        self.frames += 1;
        Ok(&self.integral)
    }

    /// Number of frames processed with this workspace.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
