//! Error taxonomy of the engine.
//!
//! - [`LoadError`]: the serialized cascade is malformed or has an unsupported
//!   version. Fatal to that load only.
//! - [`InvalidInputError`]: the frame or the detection parameters cannot be
//!   processed. Fatal to that single detection call.
//!
//! Reads outside the integral image are not part of the taxonomy: the scanner
//! validates the scaled window extent once per scale and the lookups carry
//! debug assertions.

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cascade load failed: {0}")]
    Load(#[from] LoadError),

    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Malformed or version-mismatched cascade data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("bad magic, not a cascade buffer")]
    BadMagic,

    #[error("unsupported cascade format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("truncated cascade data: needed {needed} bytes at offset {offset}, {available} left")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("{0} trailing bytes after cascade data")]
    TrailingBytes(usize),

    #[error("{what} count {count} exceeds the limit of {limit}")]
    CountLimit {
        what: &'static str,
        count: usize,
        limit: usize,
    },

    #[error("canonical window {width}x{height} must be non-empty")]
    EmptyWindow { width: u32, height: u32 },

    #[error("cascade has no stages")]
    NoStages,

    #[error("stage {stage} has no weak classifiers")]
    EmptyStage { stage: usize },

    #[error("stage {stage} classifier {classifier} has no split nodes")]
    EmptyClassifier { stage: usize, classifier: usize },

    #[error("stage {stage} classifier {classifier} has no leaf weights")]
    NoLeafWeights { stage: usize, classifier: usize },

    #[error(
        "stage {stage} classifier {classifier} node {node}: leaf index {leaf} out of range ({alphas} weights)"
    )]
    DanglingLeaf {
        stage: usize,
        classifier: usize,
        node: usize,
        leaf: usize,
        alphas: usize,
    },

    #[error(
        "stage {stage} classifier {classifier} node {node}: child {child} must point forward and below {nodes}"
    )]
    InvalidChild {
        stage: usize,
        classifier: usize,
        node: usize,
        child: usize,
        nodes: usize,
    },

    #[error(
        "stage {stage} classifier {classifier} node {node}: feature has {count} rectangles (expected 2 or 3)"
    )]
    RectCount {
        stage: usize,
        classifier: usize,
        node: usize,
        count: usize,
    },

    #[error(
        "stage {stage} classifier {classifier} node {node}: rectangle ({x},{y},{width},{height}) is empty or outside the {window_w}x{window_h} window"
    )]
    InvalidRect {
        stage: usize,
        classifier: usize,
        node: usize,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        window_w: i32,
        window_h: i32,
    },

    #[error("stage {stage}: {value} is not a finite {what}")]
    NonFinite {
        stage: usize,
        what: &'static str,
        value: f32,
    },

    #[error("stage {stage}: {link} link {target} is out of range ({stages} stages)")]
    InvalidStageLink {
        stage: usize,
        link: &'static str,
        target: i32,
        stages: usize,
    },

    #[error("cascade JSON could not be parsed: {0}")]
    Json(String),
}

/// Frame or parameter problems detected before scanning.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInputError {
    #[error("image is empty ({width}x{height})")]
    EmptyImage { width: usize, height: usize },

    #[error("unsupported channel count {0}, expected a single intensity channel")]
    UnsupportedChannels(usize),

    #[error("pixel buffer holds {len} bytes, {width}x{height} with stride {stride} needs {needed}")]
    BufferTooSmall {
        width: usize,
        height: usize,
        stride: usize,
        len: usize,
        needed: usize,
    },

    #[error("stride {stride} is smaller than width {width}")]
    BadStride { width: usize, stride: usize },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}
