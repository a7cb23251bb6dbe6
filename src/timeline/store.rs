use crate::content::model::Verse;

/// A verse's time range within the recitation audio.
///
/// `timestamp_to == 0` marks an *uncalibrated* segment: a placeholder the
/// user has not stamped yet. `duration` is signed because out-of-order
/// manual stamps are accepted without validation and may record a negative
/// duration (a defined-but-discouraged state).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// Verse key in `"<chapter>:<number>"` form.
    pub verse_key: String,
    /// Segment start, milliseconds from the beginning of the audio.
    pub timestamp_from: u64,
    /// Segment end in milliseconds; `0` means uncalibrated.
    pub timestamp_to: u64,
    /// `timestamp_to - timestamp_from`, in milliseconds.
    pub duration: i64,
}

impl Segment {
    /// Build the uncalibrated placeholder segment for a verse.
    pub fn uncalibrated(verse_key: impl Into<String>) -> Self {
        Self {
            verse_key: verse_key.into(),
            timestamp_from: 0,
            timestamp_to: 0,
            duration: 0,
        }
    }

    /// Whether this segment has a measured or manually closed end bound.
    pub fn is_calibrated(&self) -> bool {
        self.timestamp_to > 0
    }
}

/// Ordered collection of per-verse segments for the current audio/content
/// pairing, one segment per verse, in verse order.
///
/// Invariant over the calibrated prefix: for consecutive calibrated
/// segments `i`, `i + 1`, `timestamp_to[i] == timestamp_from[i + 1]`.
/// [`Timeline::stamp`] is the only mutation path that maintains it.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    segments: Vec<Segment>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Segments in timeline order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the timeline holds no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Drop all segments.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Reset to one uncalibrated segment per verse, in verse order.
    ///
    /// This is the standing default whenever no usable fetched timing
    /// exists for the current chapter/reciter pairing.
    pub fn replace(&mut self, verses: &[Verse]) {
        self.segments = verses
            .iter()
            .map(|v| Segment::uncalibrated(v.verse_key.clone()))
            .collect();
    }

    /// Install externally supplied timing verbatim if at least one entry has
    /// a positive duration; otherwise fall back to the uncalibrated default.
    pub fn replace_with_fetched(&mut self, segments: Vec<Segment>, verses: &[Verse]) {
        if segments.iter().any(|s| s.duration > 0) {
            self.segments = segments;
        } else {
            tracing::warn!(
                fetched = segments.len(),
                "fetched timing is empty or all zero-duration, using uncalibrated defaults"
            );
            self.replace(verses);
        }
    }

    /// Find the segment for a verse key. Callers treat `None` as a no-op.
    pub fn lookup(&self, verse_key: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.verse_key == verse_key)
    }

    /// Mutable variant of [`Timeline::lookup`].
    pub fn lookup_mut(&mut self, verse_key: &str) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.verse_key == verse_key)
    }

    /// Close the verse's boundary at `current_time` and chain the next
    /// segment's start to the same instant.
    ///
    /// Unknown keys are a no-op. Stamps are assumed to arrive in increasing
    /// timeline order; an out-of-order stamp is accepted as-is and may
    /// record a negative `duration` or retroactively shrink a later
    /// segment's window.
    pub fn stamp(&mut self, verse_key: &str, current_time: u64) {
        let Some(index) = self.segments.iter().position(|s| s.verse_key == verse_key) else {
            return;
        };

        let seg = &mut self.segments[index];
        seg.timestamp_to = current_time;
        seg.duration = current_time as i64 - seg.timestamp_from as i64;
        if seg.duration < 0 {
            tracing::warn!(
                verse_key,
                duration_ms = seg.duration,
                "out-of-order stamp recorded a negative duration"
            );
        }

        if let Some(next) = self.segments.get_mut(index + 1) {
            next.timestamp_from = current_time;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/store.rs"]
mod tests;
