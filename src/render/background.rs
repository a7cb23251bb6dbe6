use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::error::{TartilError, TartilResult},
    render::surface::FrameRGBA,
};

/// Supplier of decoded background frames for the compositor.
///
/// The pipeline consumes whatever the host media subsystem already decodes;
/// this trait is the seam between the compositor and that subsystem.
pub trait BackgroundSource {
    /// Decoded frame at a playback position in seconds.
    fn frame_at(&mut self, position_secs: f64) -> TartilResult<FrameRGBA>;

    /// Source duration in seconds; `0.0` means unbounded (still image).
    fn duration_secs(&self) -> f64 {
        0.0
    }
}

/// Still-image background: the same frame at every position.
pub struct ImageBackground {
    frame: FrameRGBA,
}

impl ImageBackground {
    /// Decode an image file into a background source.
    pub fn open(path: impl AsRef<Path>) -> TartilResult<Self> {
        let bytes = std::fs::read(path.as_ref())
            .with_context(|| format!("read background image '{}'", path.as_ref().display()))?;
        Self::from_bytes(&bytes)
    }

    /// Decode in-memory image bytes into a background source.
    pub fn from_bytes(bytes: &[u8]) -> TartilResult<Self> {
        let dyn_img =
            image::load_from_memory(bytes).context("decode background image from memory")?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut data = rgba.into_raw();
        premultiply_rgba8_in_place(&mut data);
        Ok(Self {
            frame: FrameRGBA {
                width,
                height,
                data,
                premultiplied: true,
            },
        })
    }
}

impl BackgroundSource for ImageBackground {
    fn frame_at(&mut self, _position_secs: f64) -> TartilResult<FrameRGBA> {
        Ok(self.frame.clone())
    }
}

/// Probed properties of a background video file.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    /// Path the info was probed from.
    pub source_path: PathBuf,
    /// Source width in pixels.
    pub width: u32,
    /// Source height in pixels.
    pub height: u32,
    /// Source duration in seconds.
    pub duration_sec: f64,
}

/// Looping video background decoded through the system `ffmpeg` binary.
///
/// Positions past the source duration wrap around, matching the looping
/// background element the overlay was designed for.
pub struct VideoBackground {
    info: VideoSourceInfo,
}

impl VideoBackground {
    /// Probe a video file and prepare it as a background source.
    pub fn open(path: impl AsRef<Path>) -> TartilResult<Self> {
        let info = probe_video(path.as_ref())?;
        Ok(Self { info })
    }

    /// Probed source properties.
    pub fn info(&self) -> &VideoSourceInfo {
        &self.info
    }
}

impl BackgroundSource for VideoBackground {
    fn frame_at(&mut self, position_secs: f64) -> TartilResult<FrameRGBA> {
        let wrapped = if self.info.duration_sec > 0.0 {
            position_secs.max(0.0) % self.info.duration_sec
        } else {
            position_secs.max(0.0)
        };
        let data = decode_video_frame_rgba8(&self.info, wrapped)?;
        Ok(FrameRGBA {
            width: self.info.width,
            height: self.info.height,
            data,
            premultiplied: true,
        })
    }

    fn duration_secs(&self) -> f64 {
        self.info.duration_sec
    }
}

#[cfg(feature = "media-ffmpeg")]
/// Probe a video file with `ffprobe`.
pub fn probe_video(source_path: &Path) -> TartilResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| TartilError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(TartilError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| TartilError::media(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| TartilError::media("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| TartilError::media("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| TartilError::media("missing video height from ffprobe"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        duration_sec,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe a video file with `ffprobe` (requires the `media-ffmpeg` feature).
pub fn probe_video(_source_path: &Path) -> TartilResult<VideoSourceInfo> {
    Err(TartilError::media(
        "video backgrounds require the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn decode_video_frame_rgba8(source: &VideoSourceInfo, source_time_sec: f64) -> TartilResult<Vec<u8>> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{source_time_sec:.9}")])
        .arg("-i")
        .arg(&source.source_path)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| TartilError::media(format!("failed to run ffmpeg for video decode: {e}")))?;

    if !out.status.success() {
        return Err(TartilError::media(format!(
            "ffmpeg video decode failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = source.width as usize * source.height as usize * 4;
    if expected_len == 0 || out.stdout.len() < expected_len {
        return Err(TartilError::media(format!(
            "decoded video frame has invalid size: got {} bytes, expected {expected_len}",
            out.stdout.len()
        )));
    }
    Ok(out.stdout[..expected_len].to_vec())
}

#[cfg(not(feature = "media-ffmpeg"))]
fn decode_video_frame_rgba8(
    _source: &VideoSourceInfo,
    _source_time_sec: f64,
) -> TartilResult<Vec<u8>> {
    Err(TartilError::media(
        "video backgrounds require the 'media-ffmpeg' feature",
    ))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
