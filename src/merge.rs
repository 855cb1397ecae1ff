//! Grouping of overlapping raw windows into final detections.
//!
//! Raw windows are partitioned into equivalence classes by the transitive
//! closure of a similarity predicate: two boxes are similar when each of
//! their four edges differs by at most
//! `δ = eps · (min(w₁, w₂) + min(h₁, h₂)) / 2`. Each class is averaged into
//! one box. Classes with fewer than `min_neighbors` members are dropped, as
//! are classes lying inside a better supported surviving class.
use crate::error::InvalidInputError;
use crate::types::{BoundingBox, Detection, RawDetection};
use log::debug;
use serde::{Deserialize, Serialize};

/// Grouping knobs.
///
/// - `min_neighbors`: minimum class size kept; `0` disables grouping and
///   returns every raw window as its own detection.
/// - `eps`: relative edge tolerance of the similarity predicate, also used as
///   the containment slack of the inner-box filter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeParams {
    pub min_neighbors: usize,
    pub eps: f32,
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            min_neighbors: 3,
            eps: 0.2,
        }
    }
}

impl MergeParams {
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        if !(self.eps.is_finite() && self.eps >= 0.0) {
            return Err(InvalidInputError::InvalidParameter {
                name: "eps",
                reason: format!("{} must be a finite non-negative value", self.eps),
            });
        }
        Ok(())
    }
}

/// Group accepted windows; confidence is the best final-stage score of the
/// class members.
pub fn group_detections(raw: &[RawDetection], params: &MergeParams) -> Vec<Detection> {
    let scored: Vec<(BoundingBox, f32)> = raw.iter().map(|d| (d.bbox, d.score)).collect();
    group_scored(&scored, params)
}

/// Group bare boxes (confidence 0).
pub fn group_rectangles(boxes: &[BoundingBox], params: &MergeParams) -> Vec<Detection> {
    let scored: Vec<(BoundingBox, f32)> = boxes.iter().map(|&b| (b, 0.0)).collect();
    group_scored(&scored, params)
}

/// Similarity predicate used to build the equivalence classes.
pub fn similar(a: &BoundingBox, b: &BoundingBox, eps: f32) -> bool {
    let delta = eps * (a.width.min(b.width) + a.height.min(b.height)) as f32 * 0.5;
    (a.x - b.x).abs() as f32 <= delta
        && (a.y - b.y).abs() as f32 <= delta
        && ((a.x + a.width) - (b.x + b.width)).abs() as f32 <= delta
        && ((a.y + a.height) - (b.y + b.height)).abs() as f32 <= delta
}

#[derive(Clone, Copy, Default)]
struct ClassAccumulator {
    x: i64,
    y: i64,
    width: i64,
    height: i64,
    members: usize,
    best: f32,
}

impl ClassAccumulator {
    fn push(&mut self, b: &BoundingBox, score: f32) {
        self.best = if self.members == 0 { score } else { self.best.max(score) };
        self.x += b.x as i64;
        self.y += b.y as i64;
        self.width += b.width as i64;
        self.height += b.height as i64;
        self.members += 1;
    }

    fn average(&self) -> BoundingBox {
        let n = self.members as f64;
        let avg = |v: i64| (v as f64 / n).round() as i32;
        BoundingBox::new(avg(self.x), avg(self.y), avg(self.width), avg(self.height))
    }
}

fn group_scored(items: &[(BoundingBox, f32)], params: &MergeParams) -> Vec<Detection> {
    if params.min_neighbors == 0 {
        return items
            .iter()
            .map(|&(bbox, score)| Detection {
                bbox,
                neighbors: 1,
                confidence: score,
            })
            .collect();
    }

    let boxes: Vec<BoundingBox> = items.iter().map(|(b, _)| *b).collect();
    let (labels, class_count) = partition(&boxes, params.eps);
    let mut classes = vec![ClassAccumulator::default(); class_count];
    for (&label, (bbox, score)) in labels.iter().zip(items) {
        classes[label].push(bbox, *score);
    }

    let candidates: Vec<(BoundingBox, &ClassAccumulator)> = classes
        .iter()
        .filter(|c| c.members >= params.min_neighbors)
        .map(|c| (c.average(), c))
        .collect();

    let kept: Vec<Detection> = candidates
        .iter()
        .enumerate()
        .filter(|(i, (inner, class))| {
            !candidates.iter().enumerate().any(|(j, (outer, other))| {
                *i != j
                    && lies_inside(inner, outer, params.eps)
                    && (other.members > class.members.max(3) || class.members < 3)
            })
        })
        .map(|(_, (bbox, class))| Detection {
            bbox: *bbox,
            neighbors: class.members,
            confidence: class.best,
        })
        .collect();

    debug!(
        "merge: {} raw windows, {} classes, {} above min_neighbors, {} kept",
        items.len(),
        class_count,
        candidates.len(),
        kept.len()
    );
    kept
}

/// `inner` within `outer` expanded by `eps` of the outer size.
fn lies_inside(inner: &BoundingBox, outer: &BoundingBox, eps: f32) -> bool {
    let dx = (outer.width as f32 * eps).round() as i32;
    let dy = (outer.height as f32 * eps).round() as i32;
    inner.x >= outer.x - dx
        && inner.y >= outer.y - dy
        && inner.x + inner.width <= outer.x + outer.width + dx
        && inner.y + inner.height <= outer.y + outer.height + dy
}

/// Label every box with its equivalence class. Classes are numbered in the
/// order their first member appears.
fn partition(boxes: &[BoundingBox], eps: f32) -> (Vec<usize>, usize) {
    let mut sets = DisjointSet::new(boxes.len());
    for i in 0..boxes.len() {
        for j in 0..i {
            if similar(&boxes[i], &boxes[j], eps) {
                sets.union(i, j);
            }
        }
    }

    let mut class_of_root = vec![usize::MAX; boxes.len()];
    let mut class_count = 0;
    let labels = (0..boxes.len())
        .map(|i| {
            let root = sets.find(i);
            if class_of_root[root] == usize::MAX {
                class_of_root[root] = class_count;
                class_count += 1;
            }
            class_of_root[root]
        })
        .collect();
    (labels, class_count)
}

/// Union-find with union by rank and path compression.
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[i] != root {
            let next = self.parent[i];
            self.parent[i] = root;
            i = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}
