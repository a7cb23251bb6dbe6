//! Tartil aligns a Quran recitation audio track with its verse text and
//! turns the result into an overlaid video.
//!
//! The public API is session-oriented:
//!
//! - Load a chapter into a [`SessionContext`] through a [`ContentProvider`]
//! - Stamp verse boundaries against a [`MediaClock`] while the audio plays
//! - Export, hand-edit and re-import the timing as a text report
//! - Capture the composited overlay to MP4 with a [`Recorder`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// MP4 capture pipeline: ffmpeg sink and the recorder state machine.
pub mod capture;
/// Verse/audio content collaborators (quran.com API, Gemini transliteration).
pub mod content;
mod foundation;
/// Compositor and raster surfaces.
pub mod render;
/// Timestamp report serialization and parsing.
pub mod report;
/// Session controller over timeline, content and reports.
pub mod session;
/// Segment timeline store and playback clock adapter.
pub mod timeline;

pub use crate::foundation::core::{Canvas, Point, Rect, Rgba8, Vec2, secs_to_ms};
pub use crate::foundation::error::{TartilError, TartilResult};

pub use crate::capture::encoder::{FfmpegSink, FfmpegSinkOpts, FrameSink, InMemorySink, SinkConfig};
pub use crate::capture::recorder::{CaptureClock, Recorder, RecorderState, is_capture_supported};
pub use crate::content::gemini::GeminiTransliterator;
pub use crate::content::model::{AudioTimestamps, Verse};
pub use crate::content::provider::ContentProvider;
pub use crate::content::quran_api::QuranApiClient;
pub use crate::render::background::{BackgroundSource, ImageBackground, VideoBackground};
pub use crate::render::compositor::OverlayCompositor;
pub use crate::render::cpu::CpuSurface;
pub use crate::render::surface::{FrameRGBA, RasterSurface, TextAlign, TextDirection, TextStyle};
pub use crate::report::codec::ReportBlock;
pub use crate::session::SessionContext;
pub use crate::timeline::clock::{ActiveSegment, ClockAdapter, MediaClock};
pub use crate::timeline::store::{Segment, Timeline};
