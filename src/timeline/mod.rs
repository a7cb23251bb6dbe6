/// Playback clock seam and active-segment resolution.
pub mod clock;
/// Segment data model and the timeline store.
pub mod store;
