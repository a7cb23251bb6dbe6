use crate::{
    foundation::core::{Canvas, Rect, Rgba8},
    foundation::error::TartilResult,
    render::surface::{FrameRGBA, RasterSurface, TextAlign, TextDirection, TextStyle},
    session::SessionContext,
    timeline::clock::{ActiveSegment, ClockAdapter},
};

/// Height of the bottom text band in pixels (four lines of text).
const BAND_HEIGHT_PX: f64 = 250.0;
/// Horizontal margin for overlay text.
const MARGIN_PX: f64 = 40.0;
/// Fraction of the surface width given to the translation column.
const TRANSLATION_COLUMN_FRAC: f64 = 0.45;
/// Line advance for wrapped translation text.
const LINE_HEIGHT_PX: f64 = 30.0;

const TITLE_SIZE_PX: f32 = 24.0;
const SUBTITLE_SIZE_PX: f32 = 32.0;
const PRIMARY_SIZE_PX: f32 = 40.0;
const TRANSLITERATION_SIZE_PX: f32 = 20.0;
const TRANSLATION_SIZE_PX: f32 = 22.0;

const TITLE_TOP_PX: f64 = 26.0;
const SUBTITLE_TOP_PX: f64 = 58.0;

const COLOR_WHITE: Rgba8 = [255, 255, 255, 255];
const COLOR_TRANSLITERATION: Rgba8 = [52, 211, 153, 255];
const COLOR_TRANSLATION: Rgba8 = [226, 232, 240, 255];
const BAND_TOP_COLOR: Rgba8 = [0, 0, 0, 153];
const BAND_BOTTOM_COLOR: Rgba8 = [0, 0, 0, 229];

/// Per-frame compositor painting background, title chrome and the active
/// verse's text overlay onto a fixed-size surface.
///
/// The compositor only reads session state; within a tick the clock read,
/// active-segment resolution and paint happen back to back with no other
/// engine code in between.
pub struct OverlayCompositor {
    canvas: Canvas,
    latin_font: Vec<u8>,
    arabic_font: Vec<u8>,
}

impl OverlayCompositor {
    /// Build a compositor for a canvas with the two font faces the overlay
    /// uses (Latin for chrome/translation, Arabic-capable for the primary
    /// text).
    pub fn new(canvas: Canvas, latin_font: Vec<u8>, arabic_font: Vec<u8>) -> Self {
        Self {
            canvas,
            latin_font,
            arabic_font,
        }
    }

    /// Output canvas dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Paint one frame: background scaled to fill, bottom gradient band,
    /// centered title lines, and — when a closed segment is active at
    /// `current_time` — the verse overlay (RTL primary text, transliteration,
    /// word-wrapped translation).
    #[tracing::instrument(skip(self, surface, background, session))]
    pub fn composite(
        &self,
        surface: &mut dyn RasterSurface,
        background: &FrameRGBA,
        session: &SessionContext,
        current_time: u64,
    ) -> TartilResult<()> {
        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);

        surface.begin_frame()?;
        surface.draw_frame_fill(background)?;

        let band_top = h - BAND_HEIGHT_PX;
        surface.fill_vertical_gradient(
            Rect::new(0.0, band_top, w, h),
            BAND_TOP_COLOR,
            BAND_BOTTOM_COLOR,
        )?;

        let title_style = TextStyle {
            font_bytes: &self.latin_font,
            size_px: TITLE_SIZE_PX,
            color: COLOR_WHITE,
            direction: TextDirection::LeftToRight,
        };
        surface.draw_text(
            &session.reciter_name,
            w / 2.0,
            TITLE_TOP_PX,
            TextAlign::Center,
            &title_style,
        )?;
        let subtitle_style = TextStyle {
            font_bytes: &self.arabic_font,
            size_px: SUBTITLE_SIZE_PX,
            color: COLOR_WHITE,
            direction: TextDirection::LeftToRight,
        };
        surface.draw_text(
            &session.chapter_title,
            w / 2.0,
            SUBTITLE_TOP_PX,
            TextAlign::Center,
            &subtitle_style,
        )?;

        // Only a closed (calibrated) match paints verse text; pending
        // segments exist for the stamping workflow, not the overlay.
        let Some(ActiveSegment::Closed(seg)) =
            ClockAdapter::resolve_active(&session.timeline, current_time)
        else {
            return Ok(());
        };
        let Some(verse) = session.verse(&seg.verse_key) else {
            return Ok(());
        };

        let primary_style = TextStyle {
            font_bytes: &self.arabic_font,
            size_px: PRIMARY_SIZE_PX,
            color: COLOR_WHITE,
            direction: TextDirection::RightToLeft,
        };
        let primary_top = band_top + 20.0;
        surface.draw_text(
            &verse.primary_text,
            w - MARGIN_PX,
            primary_top,
            TextAlign::Right,
            &primary_style,
        )?;

        if let Some(transliteration) = session.transliteration_for(&seg.verse_key) {
            let style = TextStyle {
                font_bytes: &self.latin_font,
                size_px: TRANSLITERATION_SIZE_PX,
                color: COLOR_TRANSLITERATION,
                direction: TextDirection::LeftToRight,
            };
            surface.draw_text(
                transliteration,
                w - MARGIN_PX,
                primary_top + 60.0,
                TextAlign::Right,
                &style,
            )?;
        }

        let translation = crate::report::codec::strip_footnotes(&verse.translation_text);
        if !translation.is_empty() {
            let style = TextStyle {
                font_bytes: &self.latin_font,
                size_px: TRANSLATION_SIZE_PX,
                color: COLOR_TRANSLATION,
                direction: TextDirection::LeftToRight,
            };
            let column_width = w * TRANSLATION_COLUMN_FRAC - MARGIN_PX;
            let mut y = band_top + 28.0;
            for line in wrap_words(surface, &translation, &style, column_width)? {
                surface.draw_text(&line, MARGIN_PX, y, TextAlign::Left, &style)?;
                y += LINE_HEIGHT_PX;
            }
        }

        Ok(())
    }
}

/// Greedy word wrap against measured pixel widths.
///
/// Words accumulate into a line while the candidate line fits `max_width`;
/// the word that would overflow starts the next line. A single word wider
/// than the budget is placed unsplit. Joining the emitted lines with single
/// spaces reproduces the input word sequence.
pub fn wrap_words(
    surface: &mut dyn RasterSurface,
    text: &str,
    style: &TextStyle<'_>,
    max_width: f64,
) -> TartilResult<Vec<String>> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if surface.measure_text(&candidate, style)? > max_width {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        } else {
            line = candidate;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    Ok(lines)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
