use crate::{
    foundation::core::secs_to_ms,
    timeline::store::{Segment, Timeline},
};

/// Read-only view of the host media element's transport state.
///
/// The engine never receives notifications from the media subsystem; it
/// polls this interface once per compositor tick, so active-segment
/// resolution is bounded by tick frequency, not sample accuracy.
pub trait MediaClock {
    /// Continuous playback position in seconds (resets on seek).
    fn position_secs(&self) -> f64;
    /// Whether playback is currently paused.
    fn is_paused(&self) -> bool;
    /// Whether the media has reached its end.
    fn has_ended(&self) -> bool;
}

/// The segment the clock adapter reports for the current playback position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSegment<'a> {
    /// A closed, calibrated match: `from <= t <= to` with `to > 0`.
    Closed(&'a Segment),
    /// An uncalibrated (or not-yet-reached) segment surfaced as the one the
    /// user is expected to close next.
    Pending(&'a Segment),
}

impl<'a> ActiveSegment<'a> {
    /// The underlying segment regardless of match kind.
    pub fn segment(&self) -> &'a Segment {
        match self {
            Self::Closed(s) | Self::Pending(s) => s,
        }
    }

    /// Whether this is a pending (fallback) match.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

/// Stateless adapter from host media position to active segment.
pub struct ClockAdapter;

impl ClockAdapter {
    /// Current engine time in integer milliseconds, polled from the clock.
    pub fn current_time_ms(clock: &dyn MediaClock) -> u64 {
        secs_to_ms(clock.position_secs())
    }

    /// Resolve the active segment for `current_time`.
    ///
    /// Two-step policy, required because calibration is incremental and
    /// user-driven:
    /// 1. A closed calibrated match (`from <= t <= to`, `to > 0`) wins; the
    ///    contiguity invariant guarantees at most one in the calibrated
    ///    region, and on a violated invariant the first in timeline order
    ///    wins.
    /// 2. Otherwise the first segment with `to == 0` or `from > t` is
    ///    surfaced as pending, so the user always sees which verse to stamp
    ///    next even with zero duration data.
    pub fn resolve_active(timeline: &Timeline, current_time: u64) -> Option<ActiveSegment<'_>> {
        if let Some(seg) = timeline.segments().iter().find(|s| {
            s.timestamp_to > 0
                && s.timestamp_from <= current_time
                && current_time <= s.timestamp_to
        }) {
            return Some(ActiveSegment::Closed(seg));
        }

        timeline
            .segments()
            .iter()
            .find(|s| s.timestamp_to == 0 || s.timestamp_from > current_time)
            .map(ActiveSegment::Pending)
    }

    /// Poll the clock and resolve in one step.
    pub fn resolve_from_clock<'a>(
        timeline: &'a Timeline,
        clock: &dyn MediaClock,
    ) -> Option<ActiveSegment<'a>> {
        Self::resolve_active(timeline, Self::current_time_ms(clock))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/clock.rs"]
mod tests;
