//! Hand-built cascades shared by the unit tests.
use super::description::*;
use super::model::{FeatureNormalization, WindowSize, CASCADE_FORMAT_VERSION};

pub(crate) fn rect(x: i32, y: i32, width: i32, height: i32, weight: f32) -> RectDescription {
    RectDescription {
        x,
        y,
        width,
        height,
        weight,
    }
}

/// Responds to a window whose bottom half is brighter than the whole.
pub(crate) fn bottom_half_rects() -> Vec<RectDescription> {
    vec![rect(0, 0, 20, 20, -1.0), rect(0, 10, 20, 10, 2.0)]
}

/// Responds to a window whose right half is brighter than the whole.
pub(crate) fn right_half_rects() -> Vec<RectDescription> {
    vec![rect(0, 0, 20, 20, -1.0), rect(10, 0, 10, 20, 2.0)]
}

/// 20×20 cascade: a bottom-half stump, then a depth-2 tree that re-checks
/// the bottom half and scores the left/right balance.
pub(crate) fn two_stage_description() -> CascadeDescription {
    CascadeDescription {
        version: CASCADE_FORMAT_VERSION,
        window: WindowSize {
            width: 20,
            height: 20,
        },
        normalization: FeatureNormalization::Variance,
        stages: vec![
            StageDescription {
                threshold: 0.0,
                next: 1,
                parent: NO_LINK,
                classifiers: vec![ClassifierDescription {
                    nodes: vec![NodeDescription {
                        rects: bottom_half_rects(),
                        threshold: 0.1,
                        left: 0,
                        right: -1,
                    }],
                    alpha: vec![-1.0, 1.0],
                }],
            },
            StageDescription {
                threshold: 0.5,
                next: NO_LINK,
                parent: 0,
                classifiers: vec![ClassifierDescription {
                    nodes: vec![
                        NodeDescription {
                            rects: bottom_half_rects(),
                            threshold: 0.1,
                            left: 0,
                            right: 1,
                        },
                        NodeDescription {
                            rects: right_half_rects(),
                            threshold: 0.5,
                            left: -1,
                            right: -2,
                        },
                    ],
                    alpha: vec![-1.0, 1.0, 0.5],
                }],
            },
        ],
    }
}
