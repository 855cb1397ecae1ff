//! Serializable table form of a cascade, as written out by a trainer.
//!
//! The table mirrors the trained data verbatim: split nodes keep their signed
//! child encoding (`> 0` selects the node with that index inside the same
//! classifier, `<= 0` selects leaf weight `alpha[-v]`), stages keep `-1` for
//! missing tree links, and three-slot rectangle lists may be padded with an
//! all-zero entry. [`CascadeDescription::build`] validates the table and
//! decodes it into the arena model; [`Cascade::to_description`] goes the other
//! way so both serialized formats share one validation path.
use super::model::{
    Cascade, Edge, Feature, FeatureNormalization, HaarRect, SplitNode, Span, Stage,
    WeakClassifier, WindowSize, CASCADE_FORMAT_VERSION,
};
use crate::error::LoadError;
use log::warn;
use serde::{Deserialize, Serialize};

/// Marker for an absent `next`/`parent` stage link.
pub const NO_LINK: i32 = -1;

fn default_version() -> u32 {
    CASCADE_FORMAT_VERSION
}

fn no_link() -> i32 {
    NO_LINK
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CascadeDescription {
    #[serde(default = "default_version")]
    pub version: u32,
    pub window: WindowSize,
    #[serde(default)]
    pub normalization: FeatureNormalization,
    pub stages: Vec<StageDescription>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageDescription {
    pub threshold: f32,
    #[serde(default = "no_link")]
    pub next: i32,
    #[serde(default = "no_link")]
    pub parent: i32,
    pub classifiers: Vec<ClassifierDescription>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifierDescription {
    pub nodes: Vec<NodeDescription>,
    pub alpha: Vec<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub rects: Vec<RectDescription>,
    pub threshold: f32,
    pub left: i32,
    pub right: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RectDescription {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub weight: f32,
}

impl RectDescription {
    fn is_padding(&self) -> bool {
        self.x == 0 && self.y == 0 && self.width == 0 && self.height == 0 && self.weight == 0.0
    }
}

/// Indices of the node being decoded, carried into every error.
#[derive(Clone, Copy)]
struct NodeAt {
    stage: usize,
    classifier: usize,
    node: usize,
}

impl CascadeDescription {
    /// Validate the table and decode it into the arena model.
    pub fn build(&self) -> Result<Cascade, LoadError> {
        if self.version != CASCADE_FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: self.version,
                expected: CASCADE_FORMAT_VERSION,
            });
        }
        let window = self.window;
        if window.width == 0 || window.height == 0 {
            return Err(LoadError::EmptyWindow {
                width: window.width,
                height: window.height,
            });
        }
        if self.stages.is_empty() {
            return Err(LoadError::NoStages);
        }

        let mut out = Cascade {
            version: self.version,
            window,
            normalization: self.normalization,
            rects: Vec::new(),
            features: Vec::new(),
            nodes: Vec::new(),
            classifiers: Vec::new(),
            stages: Vec::with_capacity(self.stages.len()),
        };

        for (si, stage) in self.stages.iter().enumerate() {
            if !stage.threshold.is_finite() {
                return Err(LoadError::NonFinite {
                    stage: si,
                    what: "stage threshold",
                    value: stage.threshold,
                });
            }
            if stage.classifiers.is_empty() {
                return Err(LoadError::EmptyStage { stage: si });
            }
            let next = decode_link(si, "next", stage.next, self.stages.len())?;
            let parent = decode_link(si, "parent", stage.parent, self.stages.len())?;

            let first_classifier = out.classifiers.len();
            for (ci, classifier) in stage.classifiers.iter().enumerate() {
                let nodes = decode_classifier(&mut out, si, ci, classifier)?;
                out.classifiers.push(WeakClassifier { nodes });
            }
            out.stages.push(Stage {
                classifiers: Span::new(first_classifier, stage.classifiers.len()),
                threshold: stage.threshold,
                next,
                parent,
            });
        }
        Ok(out)
    }
}

fn decode_link(
    stage: usize,
    link: &'static str,
    target: i32,
    stages: usize,
) -> Result<Option<u32>, LoadError> {
    match target {
        NO_LINK => Ok(None),
        t if t >= 0 && (t as usize) < stages => Ok(Some(t as u32)),
        t => Err(LoadError::InvalidStageLink {
            stage,
            link,
            target: t,
            stages,
        }),
    }
}

fn decode_classifier(
    out: &mut Cascade,
    stage: usize,
    classifier: usize,
    desc: &ClassifierDescription,
) -> Result<Span, LoadError> {
    if desc.nodes.is_empty() {
        return Err(LoadError::EmptyClassifier { stage, classifier });
    }
    if desc.alpha.is_empty() {
        return Err(LoadError::NoLeafWeights { stage, classifier });
    }
    if let Some(&bad) = desc.alpha.iter().find(|a| !a.is_finite()) {
        return Err(LoadError::NonFinite {
            stage,
            what: "leaf weight",
            value: bad,
        });
    }

    let first_node = out.nodes.len();
    for (ni, node) in desc.nodes.iter().enumerate() {
        let at = NodeAt {
            stage,
            classifier,
            node: ni,
        };
        if !node.threshold.is_finite() {
            return Err(LoadError::NonFinite {
                stage,
                what: "node threshold",
                value: node.threshold,
            });
        }
        let feature = decode_feature(out, at, &node.rects)?;
        let left = decode_edge(at, node.left, &desc.alpha, desc.nodes.len())?;
        let right = decode_edge(at, node.right, &desc.alpha, desc.nodes.len())?;
        out.nodes.push(SplitNode {
            feature,
            threshold: node.threshold,
            left,
            right,
        });
    }
    Ok(Span::new(first_node, desc.nodes.len()))
}

fn decode_edge(at: NodeAt, value: i32, alpha: &[f32], nodes: usize) -> Result<Edge, LoadError> {
    if value <= 0 {
        let leaf = value.unsigned_abs() as usize;
        return alpha.get(leaf).map(|&w| Edge::Leaf(w)).ok_or(LoadError::DanglingLeaf {
            stage: at.stage,
            classifier: at.classifier,
            node: at.node,
            leaf,
            alphas: alpha.len(),
        });
    }
    let child = value as usize;
    if child <= at.node || child >= nodes {
        return Err(LoadError::InvalidChild {
            stage: at.stage,
            classifier: at.classifier,
            node: at.node,
            child,
            nodes,
        });
    }
    Ok(Edge::Internal(child as u32))
}

fn decode_feature(
    out: &mut Cascade,
    at: NodeAt,
    rects: &[RectDescription],
) -> Result<u32, LoadError> {
    let window = out.window;
    let first_rect = out.rects.len();
    for r in rects.iter().filter(|r| !r.is_padding()) {
        let inside = r.width > 0
            && r.height > 0
            && r.x >= 0
            && r.y >= 0
            && (r.x as i64 + r.width as i64) <= window.width as i64
            && (r.y as i64 + r.height as i64) <= window.height as i64;
        if !inside {
            return Err(LoadError::InvalidRect {
                stage: at.stage,
                classifier: at.classifier,
                node: at.node,
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
                window_w: window.width as i32,
                window_h: window.height as i32,
            });
        }
        if !r.weight.is_finite() {
            return Err(LoadError::NonFinite {
                stage: at.stage,
                what: "rectangle weight",
                value: r.weight,
            });
        }
        out.rects.push(HaarRect {
            x: r.x as u32,
            y: r.y as u32,
            width: r.width as u32,
            height: r.height as u32,
            weight: r.weight,
        });
    }
    let count = out.rects.len() - first_rect;
    if !(2..=3).contains(&count) {
        return Err(LoadError::RectCount {
            stage: at.stage,
            classifier: at.classifier,
            node: at.node,
            count,
        });
    }
    out.features.push(Feature {
        rects: Span::new(first_rect, count),
    });
    Ok((out.features.len() - 1) as u32)
}

impl Cascade {
    /// Parse and validate the JSON table form.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let desc: CascadeDescription =
            serde_json::from_str(json).map_err(|e| LoadError::Json(e.to_string()))?;
        if desc.version != CASCADE_FORMAT_VERSION {
            warn!(
                "Cascade::from_json_str: table declares version {}, only {} is understood",
                desc.version, CASCADE_FORMAT_VERSION
            );
        }
        desc.build()
    }

    /// Re-encode the model as a table. Leaf weights are numbered per
    /// classifier in the order their edges appear.
    pub fn to_description(&self) -> CascadeDescription {
        let stages = self
            .stages
            .iter()
            .map(|stage| StageDescription {
                threshold: stage.threshold,
                next: stage.next.map_or(NO_LINK, |v| v as i32),
                parent: stage.parent.map_or(NO_LINK, |v| v as i32),
                classifiers: self
                    .stage_classifiers(stage)
                    .iter()
                    .map(|c| self.describe_classifier(c))
                    .collect(),
            })
            .collect();
        CascadeDescription {
            version: self.version,
            window: self.window,
            normalization: self.normalization,
            stages,
        }
    }

    fn describe_classifier(&self, classifier: &WeakClassifier) -> ClassifierDescription {
        let mut alpha = Vec::new();
        let mut encode = |edge: Edge| match edge {
            Edge::Internal(i) => i as i32,
            Edge::Leaf(w) => {
                alpha.push(w);
                -((alpha.len() - 1) as i32)
            }
        };
        let nodes = self
            .classifier_nodes(classifier)
            .iter()
            .map(|node| {
                let rects = self
                    .feature_rects(self.feature(node.feature))
                    .iter()
                    .map(|r| RectDescription {
                        x: r.x as i32,
                        y: r.y as i32,
                        width: r.width as i32,
                        height: r.height as i32,
                        weight: r.weight,
                    })
                    .collect();
                let left = encode(node.left);
                let right = encode(node.right);
                NodeDescription {
                    rects,
                    threshold: node.threshold,
                    left,
                    right,
                }
            })
            .collect();
        ClassifierDescription { nodes, alpha }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::test_utils::two_stage_description;

    #[test]
    fn decodes_signed_child_encoding() {
        let cascade = two_stage_description().build().unwrap();
        let stage = cascade.stages()[1];
        let tree = cascade.stage_classifiers(&stage)[0];
        let nodes = cascade.classifier_nodes(&tree);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].left, Edge::Leaf(-1.0));
        assert_eq!(nodes[0].right, Edge::Internal(1));
        assert_eq!(nodes[1].left, Edge::Leaf(1.0));
        assert_eq!(nodes[1].right, Edge::Leaf(0.5));
    }

    #[test]
    fn padding_rectangles_are_dropped() {
        let mut desc = two_stage_description();
        desc.stages[0].classifiers[0].nodes[0].rects.push(RectDescription {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            weight: 0.0,
        });
        let cascade = desc.build().unwrap();
        let node = cascade.nodes[0];
        assert_eq!(cascade.feature_rects(cascade.feature(node.feature)).len(), 2);
    }

    #[test]
    fn rejects_dangling_leaf() {
        let mut desc = two_stage_description();
        desc.stages[0].classifiers[0].nodes[0].right = -5;
        assert!(matches!(
            desc.build(),
            Err(LoadError::DanglingLeaf { leaf: 5, alphas: 2, .. })
        ));
    }

    #[test]
    fn rejects_backward_or_self_edges() {
        let mut desc = two_stage_description();
        desc.stages[1].classifiers[0].nodes[1].left = 1;
        assert!(matches!(
            desc.build(),
            Err(LoadError::InvalidChild { node: 1, child: 1, .. })
        ));
    }

    #[test]
    fn rejects_non_positive_and_out_of_window_rects() {
        let mut desc = two_stage_description();
        desc.stages[0].classifiers[0].nodes[0].rects[1].height = 0;
        assert!(matches!(desc.build(), Err(LoadError::InvalidRect { .. })));

        let mut desc = two_stage_description();
        desc.stages[0].classifiers[0].nodes[0].rects[1].x = 15;
        assert!(matches!(desc.build(), Err(LoadError::InvalidRect { x: 15, .. })));
    }

    #[test]
    fn rejects_structural_gaps() {
        let mut desc = two_stage_description();
        desc.stages.clear();
        assert_eq!(desc.build(), Err(LoadError::NoStages));

        let mut desc = two_stage_description();
        desc.stages[1].classifiers.clear();
        assert_eq!(desc.build(), Err(LoadError::EmptyStage { stage: 1 }));

        let mut desc = two_stage_description();
        desc.stages[0].next = 7;
        assert!(matches!(
            desc.build(),
            Err(LoadError::InvalidStageLink { link: "next", target: 7, .. })
        ));

        let mut desc = two_stage_description();
        desc.stages[0].classifiers[0].nodes[0].rects.truncate(1);
        assert!(matches!(desc.build(), Err(LoadError::RectCount { count: 1, .. })));
    }

    #[test]
    fn description_round_trips_through_the_model() {
        let desc = two_stage_description();
        let cascade = desc.build().unwrap();
        assert_eq!(cascade.to_description(), desc);
    }

    #[test]
    fn json_defaults_fill_links_and_mode() {
        let json = r#"{
            "window": { "width": 4, "height": 4 },
            "stages": [{
                "threshold": 0.0,
                "classifiers": [{
                    "nodes": [{
                        "rects": [
                            { "x": 0, "y": 0, "width": 4, "height": 4, "weight": -1.0 },
                            { "x": 0, "y": 2, "width": 4, "height": 2, "weight": 2.0 }
                        ],
                        "threshold": 0.0, "left": 0, "right": -1
                    }],
                    "alpha": [-1.0, 1.0]
                }]
            }]
        }"#;
        let cascade = Cascade::from_json_str(json).unwrap();
        assert_eq!(cascade.version(), CASCADE_FORMAT_VERSION);
        assert_eq!(cascade.normalization(), FeatureNormalization::Variance);
        assert_eq!(cascade.stages()[0].next, None);
        assert!(matches!(Cascade::from_json_str("{"), Err(LoadError::Json(_))));
    }
}
