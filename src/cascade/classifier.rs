//! Weak classifier and stage evaluation for a single window.
use super::model::Edge;
use super::scaled::{ScaledCascade, ScaledNode};
use crate::integral::IntegralImage;

/// Window being evaluated: integral image, origin and threshold multiplier.
#[derive(Clone, Copy)]
pub struct WindowContext<'a> {
    pub integral: &'a IntegralImage,
    pub x: usize,
    pub y: usize,
    pub norm_factor: f64,
}

/// Result of one stage on one window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageOutcome {
    pub passed: bool,
    pub sum: f32,
}

/// Walk a weak classifier tree from its root and return the reached leaf
/// weight. A feature value strictly below `threshold · norm_factor` goes left.
#[inline]
pub fn evaluate_weak(
    scaled: &ScaledCascade<'_>,
    nodes: &[ScaledNode],
    ctx: &WindowContext<'_>,
) -> f32 {
    let mut node = &nodes[0];
    loop {
        let value = scaled.feature_value(node, ctx.integral, ctx.x, ctx.y);
        let edge = if value < node.threshold as f64 * ctx.norm_factor {
            node.left
        } else {
            node.right
        };
        match edge {
            Edge::Leaf(weight) => return weight,
            // forward-only edges, validated at load
            Edge::Internal(next) => node = &nodes[next as usize],
        }
    }
}

/// Sum every weak classifier of stage `index` and compare with its biased
/// threshold. All classifiers of the stage are evaluated.
pub fn evaluate_stage(
    scaled: &ScaledCascade<'_>,
    index: usize,
    ctx: &WindowContext<'_>,
) -> StageOutcome {
    let stage = &scaled.stages()[index];
    let sum: f32 = stage
        .classifiers
        .range()
        .map(|c| evaluate_weak(scaled, scaled.classifier_nodes(c), ctx))
        .sum();
    StageOutcome {
        passed: sum >= stage.threshold,
        sum,
    }
}
