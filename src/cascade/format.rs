//! Self-describing little-endian binary cascade format.
//!
//! ```text
//! magic     8 bytes  "HAARCSC\0"
//! version   u32
//! flags     u32      bit 0: variance normalisation
//! window    u32 width, u32 height
//! stages    u32 count, per stage:
//!   threshold f32, next i32, parent i32      (-1: no link)
//!   classifiers u32 count, per classifier:
//!     nodes u32 count, per node:
//!       threshold f32, left i32, right i32
//!       rects u32 count, per rect: x i32, y i32, width i32, height i32, weight f32
//!     alphas u32 count, per alpha: f32
//! ```
//!
//! Decoding produces a [`CascadeDescription`] and hands it to the shared
//! validation in [`CascadeDescription::build`].
use super::description::{
    CascadeDescription, ClassifierDescription, NodeDescription, RectDescription, StageDescription,
};
use super::model::{Cascade, FeatureNormalization, WindowSize};
use crate::error::LoadError;

pub const CASCADE_MAGIC: &[u8; 8] = b"HAARCSC\0";

const FLAG_VARIANCE_NORMALIZATION: u32 = 1;

/// Upper bounds on declared counts, checked before allocating.
pub const MAX_STAGES: usize = 1024;
pub const MAX_CLASSIFIERS_PER_STAGE: usize = 8192;
pub const MAX_NODES_PER_CLASSIFIER: usize = 64;
pub const MAX_ALPHAS: usize = 128;
pub const MAX_RECTS_PER_FEATURE: usize = 3;

/// Decode a binary cascade.
pub fn load_cascade(bytes: &[u8]) -> Result<Cascade, LoadError> {
    decode_description(bytes)?.build()
}

/// Decode the binary layout into a table without structural validation.
pub fn decode_description(bytes: &[u8]) -> Result<CascadeDescription, LoadError> {
    let mut cursor = 0usize;
    let magic = read_slice(bytes, &mut cursor, CASCADE_MAGIC.len())?;
    if magic != CASCADE_MAGIC {
        return Err(LoadError::BadMagic);
    }
    let version = read_u32(bytes, &mut cursor)?;
    let flags = read_u32(bytes, &mut cursor)?;
    let normalization = if flags & FLAG_VARIANCE_NORMALIZATION != 0 {
        FeatureNormalization::Variance
    } else {
        FeatureNormalization::Raw
    };
    let window = WindowSize {
        width: read_u32(bytes, &mut cursor)?,
        height: read_u32(bytes, &mut cursor)?,
    };

    let stage_count = read_count(bytes, &mut cursor, "stage", MAX_STAGES)?;
    let mut stages = Vec::with_capacity(stage_count);
    for _ in 0..stage_count {
        let threshold = read_f32(bytes, &mut cursor)?;
        let next = read_i32(bytes, &mut cursor)?;
        let parent = read_i32(bytes, &mut cursor)?;
        let classifier_count =
            read_count(bytes, &mut cursor, "classifier", MAX_CLASSIFIERS_PER_STAGE)?;
        let mut classifiers = Vec::with_capacity(classifier_count);
        for _ in 0..classifier_count {
            classifiers.push(read_classifier(bytes, &mut cursor)?);
        }
        stages.push(StageDescription {
            threshold,
            next,
            parent,
            classifiers,
        });
    }

    if cursor != bytes.len() {
        return Err(LoadError::TrailingBytes(bytes.len() - cursor));
    }
    Ok(CascadeDescription {
        version,
        window,
        normalization,
        stages,
    })
}

fn read_classifier(bytes: &[u8], cursor: &mut usize) -> Result<ClassifierDescription, LoadError> {
    let node_count = read_count(bytes, cursor, "node", MAX_NODES_PER_CLASSIFIER)?;
    let mut nodes = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        let threshold = read_f32(bytes, cursor)?;
        let left = read_i32(bytes, cursor)?;
        let right = read_i32(bytes, cursor)?;
        let rect_count = read_count(bytes, cursor, "rectangle", MAX_RECTS_PER_FEATURE)?;
        let mut rects = Vec::with_capacity(rect_count);
        for _ in 0..rect_count {
            rects.push(RectDescription {
                x: read_i32(bytes, cursor)?,
                y: read_i32(bytes, cursor)?,
                width: read_i32(bytes, cursor)?,
                height: read_i32(bytes, cursor)?,
                weight: read_f32(bytes, cursor)?,
            });
        }
        nodes.push(NodeDescription {
            rects,
            threshold,
            left,
            right,
        });
    }
    let alpha_count = read_count(bytes, cursor, "leaf weight", MAX_ALPHAS)?;
    let mut alpha = Vec::with_capacity(alpha_count);
    for _ in 0..alpha_count {
        alpha.push(read_f32(bytes, cursor)?);
    }
    Ok(ClassifierDescription { nodes, alpha })
}

/// Encode a table in the binary layout.
pub fn encode_description(desc: &CascadeDescription) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(CASCADE_MAGIC);
    out.extend_from_slice(&desc.version.to_le_bytes());
    let flags = match desc.normalization {
        FeatureNormalization::Variance => FLAG_VARIANCE_NORMALIZATION,
        FeatureNormalization::Raw => 0,
    };
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&desc.window.width.to_le_bytes());
    out.extend_from_slice(&desc.window.height.to_le_bytes());

    write_count(&mut out, desc.stages.len());
    for stage in &desc.stages {
        out.extend_from_slice(&stage.threshold.to_le_bytes());
        out.extend_from_slice(&stage.next.to_le_bytes());
        out.extend_from_slice(&stage.parent.to_le_bytes());
        write_count(&mut out, stage.classifiers.len());
        for classifier in &stage.classifiers {
            write_count(&mut out, classifier.nodes.len());
            for node in &classifier.nodes {
                out.extend_from_slice(&node.threshold.to_le_bytes());
                out.extend_from_slice(&node.left.to_le_bytes());
                out.extend_from_slice(&node.right.to_le_bytes());
                write_count(&mut out, node.rects.len());
                for r in &node.rects {
                    out.extend_from_slice(&r.x.to_le_bytes());
                    out.extend_from_slice(&r.y.to_le_bytes());
                    out.extend_from_slice(&r.width.to_le_bytes());
                    out.extend_from_slice(&r.height.to_le_bytes());
                    out.extend_from_slice(&r.weight.to_le_bytes());
                }
            }
            write_count(&mut out, classifier.alpha.len());
            for a in &classifier.alpha {
                out.extend_from_slice(&a.to_le_bytes());
            }
        }
    }
    out
}

impl Cascade {
    /// Serialize in the binary layout read by [`load_cascade`].
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_description(&self.to_description())
    }
}

fn write_count(out: &mut Vec<u8>, count: usize) {
    out.extend_from_slice(&(count as u32).to_le_bytes());
}

fn read_count(
    bytes: &[u8],
    cursor: &mut usize,
    what: &'static str,
    limit: usize,
) -> Result<usize, LoadError> {
    let count = read_u32(bytes, cursor)? as usize;
    if count > limit {
        return Err(LoadError::CountLimit { what, count, limit });
    }
    Ok(count)
}

fn read_u32(bytes: &[u8], cursor: &mut usize) -> Result<u32, LoadError> {
    Ok(u32::from_le_bytes(read_array(bytes, cursor)?))
}

fn read_i32(bytes: &[u8], cursor: &mut usize) -> Result<i32, LoadError> {
    Ok(i32::from_le_bytes(read_array(bytes, cursor)?))
}

fn read_f32(bytes: &[u8], cursor: &mut usize) -> Result<f32, LoadError> {
    Ok(f32::from_le_bytes(read_array(bytes, cursor)?))
}

fn read_array(bytes: &[u8], cursor: &mut usize) -> Result<[u8; 4], LoadError> {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(read_slice(bytes, cursor, 4)?);
    Ok(buf)
}

fn read_slice<'a>(bytes: &'a [u8], cursor: &mut usize, len: usize) -> Result<&'a [u8], LoadError> {
    let available = bytes.len().saturating_sub(*cursor);
    if len > available {
        return Err(LoadError::Truncated {
            offset: *cursor,
            needed: len,
            available,
        });
    }
    let slice = &bytes[*cursor..*cursor + len];
    *cursor += len;
    Ok(slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::model::CASCADE_FORMAT_VERSION;
    use crate::cascade::test_utils::two_stage_description;

    #[test]
    fn binary_and_table_forms_agree() {
        let desc = two_stage_description();
        let bytes = encode_description(&desc);
        assert_eq!(decode_description(&bytes).unwrap(), desc);
        let cascade = load_cascade(&bytes).unwrap();
        assert_eq!(cascade, desc.build().unwrap());
        assert_eq!(cascade.to_bytes(), bytes);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = encode_description(&two_stage_description());
        bytes[0] = b'X';
        assert_eq!(load_cascade(&bytes), Err(LoadError::BadMagic));
        assert_eq!(
            load_cascade(b"HAAR"),
            Err(LoadError::Truncated {
                offset: 0,
                needed: 8,
                available: 4
            })
        );
    }

    #[test]
    fn rejects_unknown_version() {
        let mut desc = two_stage_description();
        desc.version = CASCADE_FORMAT_VERSION + 1;
        let bytes = encode_description(&desc);
        assert_eq!(
            load_cascade(&bytes),
            Err(LoadError::UnsupportedVersion {
                found: CASCADE_FORMAT_VERSION + 1,
                expected: CASCADE_FORMAT_VERSION
            })
        );
    }

    #[test]
    fn rejects_every_truncation() {
        let bytes = encode_description(&two_stage_description());
        for len in 0..bytes.len() {
            assert!(
                matches!(load_cascade(&bytes[..len]), Err(LoadError::Truncated { .. })),
                "prefix of {len} bytes"
            );
        }
    }

    #[test]
    fn rejects_trailing_bytes_and_hostile_counts() {
        let mut bytes = encode_description(&two_stage_description());
        bytes.extend_from_slice(&[0, 0]);
        assert_eq!(load_cascade(&bytes), Err(LoadError::TrailingBytes(2)));

        let mut bytes = encode_description(&two_stage_description());
        // stage count follows magic, version, flags and the window size
        bytes[24..28].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            load_cascade(&bytes),
            Err(LoadError::CountLimit { what: "stage", .. })
        ));
    }

    #[test]
    fn flags_select_normalization_mode() {
        let mut desc = two_stage_description();
        desc.normalization = FeatureNormalization::Raw;
        let cascade = load_cascade(&encode_description(&desc)).unwrap();
        assert_eq!(cascade.normalization(), FeatureNormalization::Raw);
    }
}
