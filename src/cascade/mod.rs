//! Haar cascade model, loaders and per-window evaluation.
//!
//! - [`model`]: arena-and-index cascade produced by the loaders.
//! - [`description`]: serde table form (JSON) and validation.
//! - [`format`]: binary codec.
//! - [`scaled`]: geometry and weights resolved for one scan scale.
//! - [`classifier`] / [`evaluator`]: weak classifier, stage and cascade
//!   evaluation of a single window.
pub mod classifier;
pub mod description;
pub mod evaluator;
pub mod format;
pub mod model;
pub mod scaled;

#[cfg(test)]
pub(crate) mod test_utils;

pub use classifier::StageOutcome;
pub use description::CascadeDescription;
pub use evaluator::{CascadeState, StageCounter, StageObserver, WindowVerdict};
pub use format::load_cascade;
pub use model::{
    Cascade, CascadeSummary, Edge, FeatureNormalization, HaarRect, WindowSize,
    CASCADE_FORMAT_VERSION,
};
pub use scaled::{ScaledCascade, STAGE_THRESHOLD_BIAS};
