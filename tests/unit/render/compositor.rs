use super::*;
use crate::render::surface::RasterSurface;

/// Measures every character as a fixed advance and records draw calls, so
/// wrapping and layout decisions can be asserted without rasterizing.
struct RulerSurface {
    px_per_char: f64,
    draws: Vec<(String, f64, f64, TextAlign)>,
}

impl RulerSurface {
    fn new(px_per_char: f64) -> Self {
        Self {
            px_per_char,
            draws: Vec::new(),
        }
    }

    fn measure(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.px_per_char
    }
}

impl RasterSurface for RulerSurface {
    fn width(&self) -> u32 {
        1280
    }
    fn height(&self) -> u32 {
        720
    }
    fn begin_frame(&mut self) -> TartilResult<()> {
        self.draws.clear();
        Ok(())
    }
    fn fill_rect(&mut self, _rect: Rect, _color: Rgba8) -> TartilResult<()> {
        Ok(())
    }
    fn draw_frame_fill(&mut self, _frame: &FrameRGBA) -> TartilResult<()> {
        Ok(())
    }
    fn measure_text(&mut self, text: &str, _style: &TextStyle<'_>) -> TartilResult<f64> {
        Ok(self.measure(text))
    }
    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        align: TextAlign,
        _style: &TextStyle<'_>,
    ) -> TartilResult<()> {
        self.draws.push((text.to_string(), x, y, align));
        Ok(())
    }
    fn readback(&mut self) -> TartilResult<FrameRGBA> {
        Ok(FrameRGBA {
            width: 1280,
            height: 720,
            data: vec![0; 1280 * 720 * 4],
            premultiplied: true,
        })
    }
}

fn style(font: &[u8]) -> TextStyle<'_> {
    TextStyle {
        font_bytes: font,
        size_px: 22.0,
        color: [255, 255, 255, 255],
        direction: TextDirection::LeftToRight,
    }
}

#[test]
fn wrap_words_keeps_lines_within_budget() {
    let mut surface = RulerSurface::new(10.0);
    let font = [];
    let text = "rahman ve rahim olan Allahin adiyla";

    let lines = wrap_words(&mut surface, text, &style(&font), 120.0).unwrap();

    assert!(lines.len() > 1);
    for line in &lines {
        assert!(surface.measure(line) <= 120.0, "over budget: {line:?}");
    }
    assert_eq!(lines.join(" "), text);
}

#[test]
fn wrap_words_places_oversized_word_on_its_own_line() {
    let mut surface = RulerSurface::new(10.0);
    let font = [];
    let text = "a extraordinarily b";

    let lines = wrap_words(&mut surface, text, &style(&font), 50.0).unwrap();
    assert_eq!(lines, vec!["a", "extraordinarily", "b"]);
}

#[test]
fn wrap_words_on_blank_input_yields_no_lines() {
    let mut surface = RulerSurface::new(10.0);
    let font = [];
    assert!(
        wrap_words(&mut surface, "   ", &style(&font), 100.0)
            .unwrap()
            .is_empty()
    );
}

fn background_1x1() -> FrameRGBA {
    FrameRGBA {
        width: 1,
        height: 1,
        data: vec![0, 0, 0, 255],
        premultiplied: true,
    }
}

fn chrome_only_session() -> SessionContext {
    let mut session = SessionContext::new();
    session.chapter_title = "Fatiha".to_string();
    session.reciter_name = "Reciter".to_string();
    session
}

#[test]
fn composite_draws_only_chrome_without_a_closed_segment() {
    let canvas = Canvas::new(1280, 720).unwrap();
    let compositor = OverlayCompositor::new(canvas, Vec::new(), Vec::new());
    let mut surface = RulerSurface::new(10.0);
    let session = chrome_only_session();

    compositor
        .composite(&mut surface, &background_1x1(), &session, 0)
        .unwrap();

    let texts: Vec<&str> = surface.draws.iter().map(|(t, ..)| t.as_str()).collect();
    assert_eq!(texts, vec!["Reciter", "Fatiha"]);
}

#[test]
fn composite_draws_verse_overlay_inside_closed_segment() {
    let canvas = Canvas::new(1280, 720).unwrap();
    let compositor = OverlayCompositor::new(canvas, Vec::new(), Vec::new());
    let mut surface = RulerSurface::new(10.0);

    let mut session = SessionContext::new();
    let provider = StaticProvider;
    session
        .load_chapter(&provider, 1, 77, 7, "Fatiha", "Reciter")
        .unwrap();
    session.stamp("1:1", 10_000);

    compositor
        .composite(&mut surface, &background_1x1(), &session, 5_000)
        .unwrap();

    let texts: Vec<&str> = surface.draws.iter().map(|(t, ..)| t.as_str()).collect();
    assert!(texts.contains(&"بِسْمِ"));
    assert!(texts.contains(&"Bismi"));
    assert!(texts.iter().any(|t| t.contains("In the name")));

    // Primary text is right-anchored at the margin.
    let (_, x, _, align) = surface
        .draws
        .iter()
        .find(|(t, ..)| t == "بِسْمِ")
        .unwrap();
    assert_eq!(*align, TextAlign::Right);
    assert_eq!(*x, 1280.0 - 40.0);
}

struct StaticProvider;

impl crate::content::provider::ContentProvider for StaticProvider {
    fn fetch_verses(
        &self,
        _chapter_id: u32,
        _translation_id: u32,
    ) -> TartilResult<Vec<crate::content::model::Verse>> {
        Ok(vec![crate::content::model::Verse {
            verse_key: "1:1".to_string(),
            primary_text: "بِسْمِ".to_string(),
            translation_text: "In the name of Allah".to_string(),
            transliteration_text: Some("Bismi".to_string()),
        }])
    }

    fn fetch_audio_and_timestamps(
        &self,
        _reciter_id: u32,
        _chapter_id: u32,
    ) -> TartilResult<crate::content::model::AudioTimestamps> {
        Err(crate::foundation::error::TartilError::content("offline"))
    }

    fn fetch_transliteration(
        &self,
        _arabic_text: &str,
        _target_language: &str,
    ) -> TartilResult<String> {
        Err(crate::foundation::error::TartilError::content("offline"))
    }
}
