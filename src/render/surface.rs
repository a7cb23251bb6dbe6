use crate::foundation::{
    core::{Rect, Rgba8},
    error::{TartilError, TartilResult},
};

/// A decoded RGBA8 frame.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel bytes, `width * height * 4`.
    pub data: Vec<u8>,
    /// Whether color channels are premultiplied by alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Validate the byte length against the dimensions.
    pub fn validate(&self) -> TartilResult<()> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.data.len() != expected {
            return Err(TartilError::validation(format!(
                "frame data length {} does not match {}x{}",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }
}

/// Horizontal anchoring of drawn text relative to the given x coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    /// `x` is the left edge of the text.
    Left,
    /// `x` is the horizontal center of the text.
    Center,
    /// `x` is the right edge of the text.
    Right,
}

/// Base text direction of the content being drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextDirection {
    /// Left-to-right text.
    LeftToRight,
    /// Right-to-left text (primary Arabic field).
    RightToLeft,
}

/// Styling for a single text draw.
#[derive(Clone, Copy, Debug)]
pub struct TextStyle<'a> {
    /// Raw font file bytes used for shaping and rasterization.
    pub font_bytes: &'a [u8],
    /// Font size in pixels.
    pub size_px: f32,
    /// Straight-alpha RGBA8 text color.
    pub color: Rgba8,
    /// Base direction of the text content. A hint for surfaces whose text
    /// engine needs an explicit base direction; implementations with a
    /// bidi-aware shaper may resolve direction from the content instead.
    pub direction: TextDirection,
}

/// Minimal 2D raster capability the compositor needs.
///
/// The compositor is written purely against this trait so it stays portable
/// across any host able to produce a raster frame stream. The surface is
/// single-writer: only the compositor paints into it, and frame readback is
/// an independent, non-mutating consumer.
pub trait RasterSurface {
    /// Surface width in pixels.
    fn width(&self) -> u32;
    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Reset the surface for a fresh frame.
    fn begin_frame(&mut self) -> TartilResult<()>;

    /// Fill a rectangle with a straight-alpha color.
    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> TartilResult<()>;

    /// Draw a decoded frame scaled to fill the whole surface.
    fn draw_frame_fill(&mut self, frame: &FrameRGBA) -> TartilResult<()>;

    /// Measured pixel width of `text` under `style`, without drawing.
    fn measure_text(&mut self, text: &str, style: &TextStyle<'_>) -> TartilResult<f64>;

    /// Draw a single line of text. `y` is the top of the line; `x` is
    /// interpreted per `align`.
    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        align: TextAlign,
        style: &TextStyle<'_>,
    ) -> TartilResult<()>;

    /// Fill a rectangle with a vertical gradient from `top` to `bottom`.
    ///
    /// Default implementation interpolates with one-pixel bands of
    /// [`RasterSurface::fill_rect`].
    fn fill_vertical_gradient(
        &mut self,
        rect: Rect,
        top: Rgba8,
        bottom: Rgba8,
    ) -> TartilResult<()> {
        let height = rect.height().ceil().max(1.0) as u32;
        for band in 0..height {
            let t = if height <= 1 {
                0.0
            } else {
                f64::from(band) / f64::from(height - 1)
            };
            let color = std::array::from_fn(|i| {
                let a = f64::from(top[i]);
                let b = f64::from(bottom[i]);
                (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
            });
            let y0 = rect.y0 + f64::from(band);
            self.fill_rect(Rect::new(rect.x0, y0, rect.x1, y0 + 1.0), color)?;
        }
        Ok(())
    }

    /// Read the current surface contents back as a premultiplied frame.
    fn readback(&mut self) -> TartilResult<FrameRGBA>;
}
