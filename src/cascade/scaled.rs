//! Cascade geometry resolved for one scan scale.
//!
//! Every rectangle is scaled with round-half-up once per scale and its weight
//! folded with the normalisation the cascade asks for:
//! - `Variance`: weights are divided by the normalisation area and the first
//!   rectangle is re-weighted as `-Σ_{k≥1} w_k·area_k / area_0`, so a flat
//!   patch yields exactly zero even after rounding changed the areas. Node
//!   thresholds are compared against `threshold · σ` of the window.
//! - `Raw`: weights are kept, node thresholds follow the window area (`s²`).
//!
//! The normalisation rectangle is the canonical window shrunk by one pixel on
//! each side. [`ScaledCascade::extent`] bounds every read relative to the
//! window origin; the scanner checks it once per scale.
use super::model::{Cascade, Edge, FeatureNormalization, Span};
use crate::integral::IntegralImage;

/// Bias subtracted from each stage threshold when it is scaled. A window is
/// rejected iff its stage sum is below the biased threshold, so ties pass.
pub const STAGE_THRESHOLD_BIAS: f32 = 1e-4;

/// Round-half-up for the non-negative coordinates produced by scaling.
#[inline]
pub fn round_half_up(v: f32) -> u32 {
    (v + 0.5).floor().max(0.0) as u32
}

/// Rectangle in window-relative pixel coordinates at one scale.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScaledRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub weight: f32,
}

impl ScaledRect {
    #[inline]
    fn area(&self) -> u32 {
        self.width * self.height
    }

    #[inline]
    fn sum(&self, integral: &IntegralImage, ox: usize, oy: usize) -> u64 {
        integral.rect_sum(
            ox + self.x as usize,
            oy + self.y as usize,
            self.width as usize,
            self.height as usize,
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ScaledNode {
    rects: [ScaledRect; 3],
    rect_count: u8,
    /// Node threshold, already multiplied by `s²` in raw mode.
    pub threshold: f32,
    pub left: Edge,
    pub right: Edge,
}

impl ScaledNode {
    pub fn rects(&self) -> &[ScaledRect] {
        &self.rects[..self.rect_count as usize]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ScaledStage {
    pub classifiers: Span,
    /// Stored threshold minus [`STAGE_THRESHOLD_BIAS`].
    pub threshold: f32,
}

#[derive(Clone, Debug)]
pub struct ScaledCascade<'c> {
    cascade: &'c Cascade,
    scale: f32,
    window: (u32, u32),
    norm: ScaledRect,
    extent: (u32, u32),
    nodes: Vec<ScaledNode>,
    stages: Vec<ScaledStage>,
}

impl<'c> ScaledCascade<'c> {
    pub fn new(cascade: &'c Cascade, scale: f32) -> Self {
        let canonical = cascade.window();
        let window = (
            round_half_up(canonical.width as f32 * scale).max(1),
            round_half_up(canonical.height as f32 * scale).max(1),
        );
        let norm = normalization_rect(canonical.width, canonical.height, scale, window);
        let inv_area = 1.0 / norm.area() as f32;

        let mut extent = window;
        extent.0 = extent.0.max(norm.x + norm.width);
        extent.1 = extent.1.max(norm.y + norm.height);

        let mut nodes = Vec::with_capacity(cascade.nodes.len());
        for node in &cascade.nodes {
            let src = cascade.feature_rects(cascade.feature(node.feature));
            let mut rects = [ScaledRect::default(); 3];
            for (dst, r) in rects.iter_mut().zip(src) {
                *dst = ScaledRect {
                    x: round_half_up(r.x as f32 * scale),
                    y: round_half_up(r.y as f32 * scale),
                    width: round_half_up(r.width as f32 * scale).max(1),
                    height: round_half_up(r.height as f32 * scale).max(1),
                    weight: r.weight,
                };
                extent.0 = extent.0.max(dst.x + dst.width);
                extent.1 = extent.1.max(dst.y + dst.height);
            }
            let count = src.len();

            let threshold = match cascade.normalization() {
                FeatureNormalization::Variance => {
                    let mut balance = 0.0f32;
                    for r in rects[1..count].iter_mut() {
                        r.weight *= inv_area;
                        balance += r.weight * r.area() as f32;
                    }
                    rects[0].weight = -balance / rects[0].area() as f32;
                    node.threshold
                }
                FeatureNormalization::Raw => node.threshold * scale * scale,
            };

            nodes.push(ScaledNode {
                rects,
                rect_count: count as u8,
                threshold,
                left: node.left,
                right: node.right,
            });
        }

        let stages = cascade
            .stages()
            .iter()
            .map(|stage| ScaledStage {
                classifiers: stage.classifiers,
                threshold: stage.threshold - STAGE_THRESHOLD_BIAS,
            })
            .collect();

        Self {
            cascade,
            scale,
            window,
            norm,
            extent,
            nodes,
            stages,
        }
    }

    pub fn cascade(&self) -> &'c Cascade {
        self.cascade
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Scaled window size `(width, height)`.
    pub fn window(&self) -> (u32, u32) {
        self.window
    }

    /// Largest `(x + width, y + height)` read relative to the window origin.
    pub fn extent(&self) -> (u32, u32) {
        self.extent
    }

    pub fn normalization_rect(&self) -> ScaledRect {
        self.norm
    }

    pub fn stages(&self) -> &[ScaledStage] {
        &self.stages
    }

    /// Split nodes of the weak classifier at `index` in the cascade arena.
    #[inline]
    pub fn classifier_nodes(&self, index: usize) -> &[ScaledNode] {
        &self.nodes[self.cascade.classifiers[index].nodes.range()]
    }

    /// Weighted rectangle response of `node` for the window at `(x, y)`.
    #[inline]
    pub fn feature_value(
        &self,
        node: &ScaledNode,
        integral: &IntegralImage,
        x: usize,
        y: usize,
    ) -> f64 {
        node.rects()
            .iter()
            .map(|r| r.weight as f64 * r.sum(integral, x, y) as f64)
            .sum()
    }

    /// Multiplier applied to node thresholds for the window at `(x, y)`:
    /// the intensity standard deviation over the normalisation rectangle in
    /// variance mode, `1.0` in raw mode or for a perfectly flat patch.
    ///
    /// A zero variance maps to `1.0` rather than `sqrt(0) = 0`, so every
    /// node threshold keeps its trained value on flat patches instead of
    /// collapsing to zero.
    pub fn norm_factor(&self, integral: &IntegralImage, x: usize, y: usize) -> f64 {
        if self.cascade.normalization() == FeatureNormalization::Raw {
            return 1.0;
        }
        let n = &self.norm;
        let (nx, ny, w, h) = (
            x + n.x as usize,
            y + n.y as usize,
            n.width as usize,
            n.height as usize,
        );
        let area = (w * h) as f64;
        let mean = integral.rect_sum(nx, ny, w, h) as f64 / area;
        let mean_sq = integral.rect_sq_sum(nx, ny, w, h) as f64 / area;
        let variance = mean_sq - mean * mean;
        if variance > 0.0 {
            variance.sqrt()
        } else {
            1.0
        }
    }
}

fn normalization_rect(width: u32, height: u32, scale: f32, window: (u32, u32)) -> ScaledRect {
    if width <= 2 || height <= 2 {
        return ScaledRect {
            x: 0,
            y: 0,
            width: window.0,
            height: window.1,
            weight: 1.0,
        };
    }
    let inset = round_half_up(scale);
    ScaledRect {
        x: inset,
        y: inset,
        width: round_half_up((width - 2) as f32 * scale).max(1),
        height: round_half_up((height - 2) as f32 * scale).max(1),
        weight: 1.0,
    }
}
