use super::*;

struct FakeClock {
    position_secs: f64,
    paused: bool,
    ended: bool,
}

impl MediaClock for FakeClock {
    fn position_secs(&self) -> f64 {
        self.position_secs
    }
    fn is_paused(&self) -> bool {
        self.paused
    }
    fn has_ended(&self) -> bool {
        self.ended
    }
}

fn timeline(segs: &[(&str, u64, u64)]) -> Timeline {
    let mut tl = Timeline::new();
    tl.replace(
        &segs
            .iter()
            .map(|(key, _, _)| crate::content::model::Verse {
                verse_key: key.to_string(),
                primary_text: String::new(),
                translation_text: String::new(),
                transliteration_text: None,
            })
            .collect::<Vec<_>>(),
    );
    for (key, from, to) in segs {
        let seg = tl.lookup_mut(key).unwrap();
        seg.timestamp_from = *from;
        seg.timestamp_to = *to;
        seg.duration = *to as i64 - *from as i64;
    }
    tl
}

#[test]
fn closed_match_wins_inside_calibrated_window() {
    let tl = timeline(&[("1:1", 0, 5000), ("1:2", 5000, 0)]);

    let active = ClockAdapter::resolve_active(&tl, 3000).unwrap();
    assert!(matches!(active, ActiveSegment::Closed(s) if s.verse_key == "1:1"));
    assert!(!active.is_pending());
}

#[test]
fn past_calibrated_region_surfaces_first_pending() {
    let tl = timeline(&[("1:1", 0, 5000), ("1:2", 5000, 0)]);

    let active = ClockAdapter::resolve_active(&tl, 6000).unwrap();
    assert!(matches!(active, ActiveSegment::Pending(s) if s.verse_key == "1:2"));
    assert!(active.is_pending());
}

#[test]
fn fully_uncalibrated_timeline_surfaces_first_segment_as_pending() {
    let tl = timeline(&[("1:1", 0, 0), ("1:2", 0, 0)]);

    let active = ClockAdapter::resolve_active(&tl, 42_000).unwrap();
    assert_eq!(active.segment().verse_key, "1:1");
    assert!(active.is_pending());
}

#[test]
fn closed_match_is_inclusive_at_both_bounds() {
    let tl = timeline(&[("1:1", 1000, 5000)]);

    for t in [1000, 5000] {
        let active = ClockAdapter::resolve_active(&tl, t).unwrap();
        assert!(matches!(active, ActiveSegment::Closed(_)));
    }
}

#[test]
fn before_first_calibrated_segment_it_is_pending() {
    let tl = timeline(&[("1:1", 1000, 5000)]);

    let active = ClockAdapter::resolve_active(&tl, 500).unwrap();
    assert!(matches!(active, ActiveSegment::Pending(s) if s.verse_key == "1:1"));
}

#[test]
fn empty_timeline_resolves_to_none() {
    let tl = Timeline::new();
    assert!(ClockAdapter::resolve_active(&tl, 0).is_none());
}

#[test]
fn fully_calibrated_timeline_past_end_resolves_to_none() {
    let tl = timeline(&[("1:1", 0, 5000), ("1:2", 5000, 9000)]);
    assert!(ClockAdapter::resolve_active(&tl, 9001).is_none());
}

#[test]
fn current_time_ms_truncates_clock_position() {
    let clock = FakeClock {
        position_secs: 3.6789,
        paused: false,
        ended: false,
    };
    assert_eq!(ClockAdapter::current_time_ms(&clock), 3678);

    let tl = timeline(&[("1:1", 0, 5000)]);
    let active = ClockAdapter::resolve_from_clock(&tl, &clock).unwrap();
    assert_eq!(active.segment().verse_key, "1:1");
}
