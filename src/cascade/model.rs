//! In-memory cascade: one arena per entity kind, cross-referenced by index.
//!
//! Rectangles, features, split nodes, weak classifiers and stages each live in
//! a single `Vec`. Parents refer to their children through a [`Span`] into the
//! next arena, so the whole model is a handful of contiguous allocations that
//! are read-only after loading and can be shared across threads.
//!
//! A value of this type is only produced by
//! [`CascadeDescription::build`](super::CascadeDescription::build), which
//! validates every index and rectangle; the evaluators rely on that.
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Version tag written by and accepted from the serialized formats.
pub const CASCADE_FORMAT_VERSION: u32 = 1;

/// Canonical detection window the cascade was trained on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

/// How feature responses are normalised before thresholding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureNormalization {
    /// Thresholds are scaled by the window's intensity standard deviation and
    /// rectangle weights by the inverse window area (lighting invariant).
    #[default]
    Variance,
    /// Raw weighted rectangle sums; thresholds only follow the window area.
    Raw,
}

/// Contiguous run of entries in one of the cascade arenas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub len: u32,
}

impl Span {
    pub(crate) fn new(start: usize, len: usize) -> Self {
        Self {
            start: start as u32,
            len: len as u32,
        }
    }

    #[inline]
    pub fn range(self) -> Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }

    #[inline]
    pub fn len(self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// Weighted rectangle in canonical window coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HaarRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub weight: f32,
}

impl HaarRect {
    #[inline]
    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

/// Two- or three-rectangle Haar pattern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Feature {
    pub rects: Span,
}

/// Outgoing branch of a split node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    /// Terminal weight contributed to the stage sum.
    Leaf(f32),
    /// Index of another node of the same weak classifier (always greater than
    /// the index of the node holding the edge).
    Internal(u32),
}

/// One threshold split of a weak classifier tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitNode {
    pub feature: u32,
    pub threshold: f32,
    /// Taken when the feature value is strictly below the threshold.
    pub left: Edge,
    pub right: Edge,
}

/// Shallow decision tree; its root is the first node of the span.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeakClassifier {
    pub nodes: Span,
}

/// Boosted ensemble with a rejection threshold on the summed leaf weights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stage {
    pub classifiers: Span,
    pub threshold: f32,
    /// Tree-cascade links carried over from the training output. The linear
    /// evaluator ignores them.
    pub next: Option<u32>,
    pub parent: Option<u32>,
}

/// Read-only, pre-trained Haar cascade.
#[derive(Clone, Debug, PartialEq)]
pub struct Cascade {
    pub(crate) version: u32,
    pub(crate) window: WindowSize,
    pub(crate) normalization: FeatureNormalization,
    pub(crate) rects: Vec<HaarRect>,
    pub(crate) features: Vec<Feature>,
    pub(crate) nodes: Vec<SplitNode>,
    pub(crate) classifiers: Vec<WeakClassifier>,
    pub(crate) stages: Vec<Stage>,
}

impl Cascade {
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn window(&self) -> WindowSize {
        self.window
    }

    pub fn normalization(&self) -> FeatureNormalization {
        self.normalization
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn classifier_count(&self) -> usize {
        self.classifiers.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Weak classifiers of `stage`, in training order.
    pub fn stage_classifiers(&self, stage: &Stage) -> &[WeakClassifier] {
        &self.classifiers[stage.classifiers.range()]
    }

    /// Split nodes of `classifier`; index 0 is the root.
    pub fn classifier_nodes(&self, classifier: &WeakClassifier) -> &[SplitNode] {
        &self.nodes[classifier.nodes.range()]
    }

    pub fn feature(&self, index: u32) -> &Feature {
        &self.features[index as usize]
    }

    pub fn feature_rects(&self, feature: &Feature) -> &[HaarRect] {
        &self.rects[feature.rects.range()]
    }

    /// Compact description used in reports.
    pub fn summary(&self) -> CascadeSummary {
        CascadeSummary {
            version: self.version,
            window: self.window,
            normalization: self.normalization,
            stages: self.stages.len(),
            classifiers: self.classifiers.len(),
            nodes: self.nodes.len(),
            rects: self.rects.len(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeSummary {
    pub version: u32,
    pub window: WindowSize,
    pub normalization: FeatureNormalization,
    pub stages: usize,
    pub classifiers: usize,
    pub nodes: usize,
    pub rects: usize,
}
