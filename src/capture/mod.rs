/// ffmpeg frame sink and the in-memory test sink.
pub mod encoder;
/// Capture state machine and the deterministic capture clock.
pub mod recorder;
