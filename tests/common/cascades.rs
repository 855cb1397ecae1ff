use haar_detector::cascade::description::{
    ClassifierDescription, NodeDescription, RectDescription, StageDescription, NO_LINK,
};
use haar_detector::cascade::{WindowSize, CASCADE_FORMAT_VERSION};
use haar_detector::{Cascade, CascadeDescription, FeatureNormalization};

fn rect(x: i32, y: i32, width: i32, height: i32, weight: f32) -> RectDescription {
    RectDescription {
        x,
        y,
        width,
        height,
        weight,
    }
}

fn bottom_half() -> Vec<RectDescription> {
    vec![rect(0, 0, 20, 20, -1.0), rect(0, 10, 20, 10, 2.0)]
}

fn right_half() -> Vec<RectDescription> {
    vec![rect(0, 0, 20, 20, -1.0), rect(10, 0, 10, 20, 2.0)]
}

/// 20×20 cascade accepting windows whose bottom half is brighter than the
/// window as a whole. Stage 0 is a stump, stage 1 a depth-2 tree.
pub fn bottom_edge_description() -> CascadeDescription {
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
                next: NO_LINK,
                parent: NO_LINK,
                classifiers: vec![ClassifierDescription {
                    nodes: vec![NodeDescription {
                        rects: bottom_half(),
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
                parent: NO_LINK,
                classifiers: vec![ClassifierDescription {
                    nodes: vec![
                        NodeDescription {
                            rects: bottom_half(),
                            threshold: 0.1,
                            left: 0,
                            right: 1,
                        },
                        NodeDescription {
                            rects: right_half(),
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

pub fn bottom_edge_cascade() -> Cascade {
    bottom_edge_description()
        .build()
        .expect("fixture cascade is valid")
}

/// Cascade with `stages` copies of the bottom-edge stump, stage thresholds
/// rising so that later stages reject more often.
pub fn deep_cascade(stages: usize) -> Cascade {
    let mut desc = bottom_edge_description();
    let stump = desc.stages[0].clone();
    desc.stages = (0..stages)
        .map(|i| {
            let mut s = stump.clone();
            s.classifiers[0].nodes[0].threshold = 0.05 * (i + 1) as f32;
            s
        })
        .collect();
    desc.build().expect("fixture cascade is valid")
}
