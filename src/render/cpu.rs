use crate::{
    foundation::core::{Canvas, Rect, Rgba8},
    foundation::error::{TartilError, TartilResult},
    render::surface::{FrameRGBA, RasterSurface, TextAlign, TextStyle},
};

/// Straight-alpha RGBA8 brush carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TextBrushRgba8 {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

/// CPU raster surface backed by a `vello_cpu` pixmap, with Parley shaping
/// for text measurement and drawing.
///
/// Draw calls accumulate into a render context; [`RasterSurface::readback`]
/// rasterizes the accumulated frame into the pixmap and copies it out.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    text: TextLayoutEngine,
}

impl CpuSurface {
    /// Allocate a surface for the given canvas.
    pub fn new(canvas: Canvas) -> TartilResult<Self> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| TartilError::validation("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| TartilError::validation("surface height exceeds u16"))?;
        Ok(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
            text: TextLayoutEngine::new(),
        })
    }

    fn layout_for(
        &mut self,
        text: &str,
        style: &TextStyle<'_>,
    ) -> TartilResult<parley::Layout<TextBrushRgba8>> {
        let brush = TextBrushRgba8 {
            r: style.color[0],
            g: style.color[1],
            b: style.color[2],
            a: style.color[3],
        };
        self.text
            .layout_plain(text, style.font_bytes, style.size_px, brush)
    }
}

impl RasterSurface for CpuSurface {
    fn width(&self) -> u32 {
        u32::from(self.width)
    }

    fn height(&self) -> u32 {
        u32::from(self.height)
    }

    fn begin_frame(&mut self) -> TartilResult<()> {
        self.ctx = vello_cpu::RenderContext::new(self.width, self.height);
        clear_pixmap(&mut self.pixmap, [0, 0, 0, 0]);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> TartilResult<()> {
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color[0], color[1], color[2], color[3],
        ));
        self.ctx.fill_rect(&rect_to_cpu(rect));
        Ok(())
    }

    fn draw_frame_fill(&mut self, frame: &FrameRGBA) -> TartilResult<()> {
        frame.validate()?;
        if frame.width == 0 || frame.height == 0 {
            return Err(TartilError::validation("background frame has zero size"));
        }

        let pixmap = frame_to_pixmap(frame)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        // Scale the source frame to fill the whole surface.
        let sx = f64::from(self.width) / f64::from(frame.width);
        let sy = f64::from(self.height) / f64::from(frame.height);
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(frame.width),
            f64::from(frame.height),
        ));
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn measure_text(&mut self, text: &str, style: &TextStyle<'_>) -> TartilResult<f64> {
        let layout = self.layout_for(text, style)?;
        let mut width = 0.0f64;
        for line in layout.lines() {
            width = width.max(f64::from(line.metrics().advance));
        }
        Ok(width)
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        align: TextAlign,
        style: &TextStyle<'_>,
    ) -> TartilResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let layout = self.layout_for(text, style)?;
        let mut width = 0.0f64;
        for line in layout.lines() {
            width = width.max(f64::from(line.metrics().advance));
        }
        let x0 = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::Right => x - width,
        };

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(style.font_bytes.to_vec()),
            0,
        );
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((x0, y)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }

        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn readback(&mut self) -> TartilResult<FrameRGBA> {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        Ok(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl TextLayoutEngine {
    fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape and lay out one line of plain text. Line breaking is never
    /// requested here; the compositor wraps by word before drawing.
    /// Direction comes from Parley's bidi resolution of the content, so the
    /// `TextStyle` direction hint is not consulted on this surface.
    fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> TartilResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(TartilError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            TartilError::validation("no font families registered from font bytes")
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| TartilError::validation("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

fn rect_to_cpu(rect: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1)
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn frame_to_pixmap(frame: &FrameRGBA) -> TartilResult<vello_cpu::Pixmap> {
    let w: u16 = frame
        .width
        .try_into()
        .map_err(|_| TartilError::validation("frame width exceeds u16"))?;
    let h: u16 = frame
        .height
        .try_into()
        .map_err(|_| TartilError::validation("frame height exceeds u16"))?;

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(frame.width as usize * frame.height as usize);
    for px in frame.data.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        let (r, g, b) = if frame.premultiplied || a == 255 {
            (px[0], px[1], px[2])
        } else {
            (
                mul_div255(px[0], a),
                mul_div255(px[1], a),
                mul_div255(px[2], a),
            )
        };
        pixels.push(vello_cpu::peniko::color::PremulRgba8 { r, g, b, a });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn mul_div255(c: u8, a: u8) -> u8 {
    (((u16::from(c) * u16::from(a)) + 127) / 255) as u8
}
