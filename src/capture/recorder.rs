use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::{
    capture::encoder::{FfmpegSink, FfmpegSinkOpts, FrameSink, SinkConfig, is_ffmpeg_on_path},
    foundation::core::Canvas,
    foundation::error::{TartilError, TartilResult},
    render::background::BackgroundSource,
    render::compositor::OverlayCompositor,
    render::surface::RasterSurface,
    session::SessionContext,
    timeline::clock::{ClockAdapter, MediaClock},
};

/// Recorder lifecycle. Transitions only move forward around the cycle:
/// `Idle -> Recording -> Finalizing -> Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecorderState {
    /// Not capturing; a new recording may start.
    Idle,
    /// Frames are being composited and pushed to the sink.
    Recording,
    /// Capture stopped; pushed frames await container finalization.
    Finalizing,
}

/// Deterministic offline clock driving a capture run.
///
/// Position advances one frame per tick, so capture progress is independent
/// of wall-clock time. The clock reports ended once the recitation audio
/// duration is exhausted.
#[derive(Clone, Copy, Debug)]
pub struct CaptureClock {
    frame: u64,
    fps: u32,
    duration_secs: f64,
}

impl CaptureClock {
    /// Clock at position zero. `duration_secs <= 0.0` means unbounded.
    pub fn new(fps: u32, duration_secs: f64) -> TartilResult<Self> {
        if fps == 0 {
            return Err(TartilError::validation("capture fps must be non-zero"));
        }
        Ok(Self {
            frame: 0,
            fps,
            duration_secs,
        })
    }

    /// Advance by exactly one frame.
    pub fn advance(&mut self) {
        self.frame += 1;
    }

    /// Frames emitted so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl MediaClock for CaptureClock {
    fn position_secs(&self) -> f64 {
        self.frame as f64 / f64::from(self.fps)
    }

    fn is_paused(&self) -> bool {
        false
    }

    fn has_ended(&self) -> bool {
        self.duration_secs > 0.0 && self.position_secs() >= self.duration_secs
    }
}

/// Whether MP4 capture is available on this host.
pub fn is_capture_supported() -> bool {
    is_ffmpeg_on_path()
}

/// Generated output file name, unique per wall-clock millisecond.
fn generated_output_name() -> String {
    let unix_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("quran-video-{unix_ms}.mp4")
}

/// Offline capture driver: per tick it composites one frame at the capture
/// clock's position, reads it back and pushes it to the sink, then advances
/// the clock. The run auto-stops when the clock reports ended.
pub struct Recorder {
    state: RecorderState,
    clock: CaptureClock,
    sink: Option<Box<dyn FrameSink>>,
    out_path: Option<PathBuf>,
    frame_idx: u64,
}

impl Recorder {
    /// A recorder in the idle state.
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            clock: CaptureClock {
                frame: 0,
                fps: 30,
                duration_secs: 0.0,
            },
            sink: None,
            out_path: None,
            frame_idx: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// The capture clock for the active (or last) run.
    pub fn clock(&self) -> &CaptureClock {
        &self.clock
    }

    /// Start an MP4 capture into `out_dir` with a generated file name.
    ///
    /// `audio` is the downloaded recitation file together with its duration
    /// in seconds; when present it bounds the run and is muxed into the
    /// output. Refuses to start when ffmpeg is unavailable or a run is
    /// already in progress.
    pub fn start_mp4(
        &mut self,
        out_dir: impl AsRef<Path>,
        canvas: Canvas,
        fps: u32,
        audio: Option<(PathBuf, f64)>,
    ) -> TartilResult<()> {
        if !is_capture_supported() {
            return Err(TartilError::capture(
                "video capture requires ffmpeg on PATH",
            ));
        }
        let out_path = out_dir.as_ref().join(generated_output_name());
        let sink = FfmpegSink::new(FfmpegSinkOpts::new(&out_path));
        let (audio_path, duration_secs) = match audio {
            Some((path, duration)) => (Some(path), duration),
            None => (None, 0.0),
        };
        let cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
            audio: audio_path,
        };
        self.start_with_sink(Box::new(sink), cfg, duration_secs, out_path)
    }

    /// Start a capture into an arbitrary sink. The clock resets to zero.
    pub fn start_with_sink(
        &mut self,
        mut sink: Box<dyn FrameSink>,
        cfg: SinkConfig,
        duration_secs: f64,
        out_path: PathBuf,
    ) -> TartilResult<()> {
        if self.state != RecorderState::Idle {
            return Err(TartilError::capture(format!(
                "cannot start capture from state {:?}",
                self.state
            )));
        }

        self.clock = CaptureClock::new(cfg.fps, duration_secs)?;
        self.frame_idx = 0;
        sink.begin(cfg)?;
        info!(out_path = %out_path.display(), "capture started");
        self.sink = Some(sink);
        self.out_path = Some(out_path);
        self.state = RecorderState::Recording;
        Ok(())
    }

    /// Produce and push one frame, then advance the clock.
    ///
    /// Returns `true` while the run continues; `false` once it has
    /// auto-stopped on clock end (the recorder is then finalizing). A tick
    /// outside the recording state is an error.
    pub fn tick(
        &mut self,
        compositor: &OverlayCompositor,
        surface: &mut dyn RasterSurface,
        background: &mut dyn BackgroundSource,
        session: &SessionContext,
    ) -> TartilResult<bool> {
        if self.state != RecorderState::Recording {
            return Err(TartilError::capture("tick called while not recording"));
        }

        let bg_frame = background.frame_at(self.clock.position_secs())?;
        let current_time = ClockAdapter::current_time_ms(&self.clock);
        compositor.composite(surface, &bg_frame, session, current_time)?;
        let frame = surface.readback()?;

        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| TartilError::capture("recording without an open sink"))?;
        sink.push_frame(self.frame_idx, &frame)?;
        self.frame_idx += 1;
        self.clock.advance();

        if self.clock.has_ended() {
            self.stop()?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Stop pushing frames. Captured frames are retained until
    /// [`Recorder::finalize`] runs.
    pub fn stop(&mut self) -> TartilResult<()> {
        if self.state != RecorderState::Recording {
            return Err(TartilError::capture(format!(
                "cannot stop capture from state {:?}",
                self.state
            )));
        }
        self.state = RecorderState::Finalizing;
        info!(frames = self.frame_idx, "capture stopped");
        Ok(())
    }

    /// Finalize the container and return the output path. The recorder
    /// returns to idle regardless of outcome.
    pub fn finalize(&mut self) -> TartilResult<PathBuf> {
        if self.state != RecorderState::Finalizing {
            return Err(TartilError::capture(format!(
                "cannot finalize capture from state {:?}",
                self.state
            )));
        }
        let mut sink = self
            .sink
            .take()
            .ok_or_else(|| TartilError::capture("finalizing without an open sink"))?;
        let out_path = self
            .out_path
            .take()
            .ok_or_else(|| TartilError::capture("finalizing without an output path"))?;

        self.state = RecorderState::Idle;
        sink.end()?;
        info!(out_path = %out_path.display(), "capture finalized");
        Ok(out_path)
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/recorder.rs"]
mod tests;
