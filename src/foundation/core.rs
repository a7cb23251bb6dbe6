use crate::foundation::error::{TartilError, TartilResult};

pub use kurbo::{Point, Rect, Vec2};

/// Fixed output surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Construct a canvas, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> TartilResult<Self> {
        if width == 0 || height == 0 {
            return Err(TartilError::validation("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }
}

/// Straight-alpha RGBA8 color.
pub type Rgba8 = [u8; 4];

/// Convert a continuous host media position (seconds) into the engine's
/// integer millisecond clock. Negative positions clamp to zero.
pub fn secs_to_ms(position_secs: f64) -> u64 {
    if !position_secs.is_finite() || position_secs <= 0.0 {
        return 0;
    }
    (position_secs * 1000.0) as u64
}
