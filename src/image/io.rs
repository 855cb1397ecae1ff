//! File I/O for the tools: grayscale frames, detection overlays and JSON
//! reports. Decoding goes through the `image` crate; the engine itself only
//! sees [`ImageU8`] views.
use super::ImageU8;
use crate::types::Detection;
use image::{GrayImage, Luma};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Decoded frame converted to 8-bit luma.
#[derive(Clone, Debug)]
pub struct GrayFrame {
    pixels: GrayImage,
}

impl GrayFrame {
    pub fn from_gray(pixels: GrayImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> usize {
        self.pixels.width() as usize
    }

    pub fn height(&self) -> usize {
        self.pixels.height() as usize
    }

    /// Tightly packed view for the detector.
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.width(),
            h: self.height(),
            stride: self.width(),
            data: self.pixels.as_raw(),
        }
    }
}

/// Decode any format supported by the `image` features and drop colour.
pub fn load_grayscale_image(path: &Path) -> Result<GrayFrame, String> {
    let decoded =
        image::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    Ok(GrayFrame::from_gray(decoded.into_luma8()))
}

/// Write `frame` with a one-pixel white outline around every detection.
pub fn save_detections_overlay(
    frame: &GrayFrame,
    detections: &[Detection],
    path: &Path,
) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut canvas = frame.pixels.clone();
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    for det in detections {
        let b = &det.bbox;
        let (x0, y0) = (b.x as i64, b.y as i64);
        let (x1, y1) = (x0 + b.width as i64 - 1, y0 + b.height as i64 - 1);
        let outline = (x0..=x1)
            .flat_map(|x| [(x, y0), (x, y1)])
            .chain((y0..=y1).flat_map(|y| [(x0, y), (x1, y)]));
        for (x, y) in outline {
            if (0..w).contains(&x) && (0..h).contains(&y) {
                canvas.put_pixel(x as u32, y as u32, Luma([255]));
            }
        }
    }
    canvas
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Pretty-print `value` as JSON into `path`.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let file =
        File::create(path).map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))?;
    writer
        .flush()
        .map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {e}", parent.display())),
        _ => Ok(()),
    }
}
