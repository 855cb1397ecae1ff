use serde::{Deserialize, Serialize};

/// Axis-aligned box in image pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 * 0.5,
            self.y as f32 + self.height as f32 * 0.5,
        )
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// Candidate window position at one scan scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Window {
    pub x: u32,
    pub y: u32,
    pub scale: f32,
}

/// Window accepted by every stage of the cascade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDetection {
    pub window: Window,
    pub bbox: BoundingBox,
    /// Sum of the final stage.
    pub score: f32,
}

/// Merged detection emitted by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Raw windows merged into this detection.
    pub neighbors: usize,
    /// Highest final-stage score among the merged windows.
    pub confidence: f32,
}
