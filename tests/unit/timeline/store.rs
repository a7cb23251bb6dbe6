use super::*;

fn verse(key: &str) -> Verse {
    Verse {
        verse_key: key.to_string(),
        primary_text: format!("arabic {key}"),
        translation_text: format!("translation {key}"),
        transliteration_text: None,
    }
}

fn seg(key: &str, from: u64, to: u64) -> Segment {
    Segment {
        verse_key: key.to_string(),
        timestamp_from: from,
        timestamp_to: to,
        duration: to as i64 - from as i64,
    }
}

#[test]
fn replace_builds_one_uncalibrated_segment_per_verse() {
    let mut tl = Timeline::new();
    tl.replace(&[verse("1:1"), verse("1:2"), verse("1:3")]);

    assert_eq!(tl.len(), 3);
    for (s, key) in tl.segments().iter().zip(["1:1", "1:2", "1:3"]) {
        assert_eq!(s.verse_key, key);
        assert_eq!((s.timestamp_from, s.timestamp_to, s.duration), (0, 0, 0));
        assert!(!s.is_calibrated());
    }
}

#[test]
fn stamp_closes_segment_and_chains_next_start() {
    let mut tl = Timeline::new();
    tl.replace(&[verse("1:1"), verse("1:2")]);

    tl.stamp("1:1", 5000);

    let first = tl.lookup("1:1").unwrap();
    assert_eq!(first.timestamp_from, 0);
    assert_eq!(first.timestamp_to, 5000);
    assert_eq!(first.duration, 5000);
    assert!(first.is_calibrated());

    let second = tl.lookup("1:2").unwrap();
    assert_eq!(second.timestamp_from, 5000);
    assert_eq!(second.timestamp_to, 0);
    assert_eq!(second.duration, 0);
    assert!(!second.is_calibrated());
}

#[test]
fn sequential_stamps_keep_calibrated_prefix_contiguous() {
    let mut tl = Timeline::new();
    tl.replace(&[verse("1:1"), verse("1:2"), verse("1:3")]);

    tl.stamp("1:1", 4000);
    tl.stamp("1:2", 9500);
    tl.stamp("1:3", 12000);

    let segs = tl.segments();
    for pair in segs.windows(2) {
        assert_eq!(pair[0].timestamp_to, pair[1].timestamp_from);
    }
    assert_eq!(segs[2].timestamp_to, 12000);
}

#[test]
fn out_of_order_stamp_records_negative_duration() {
    let mut tl = Timeline::new();
    tl.replace(&[verse("1:1"), verse("1:2")]);

    tl.stamp("1:1", 5000);
    tl.stamp("1:2", 3000);

    let second = tl.lookup("1:2").unwrap();
    assert_eq!(second.timestamp_from, 5000);
    assert_eq!(second.timestamp_to, 3000);
    assert_eq!(second.duration, -2000);
}

#[test]
fn stamp_unknown_key_is_a_noop() {
    let mut tl = Timeline::new();
    tl.replace(&[verse("1:1")]);
    let before = tl.clone();

    tl.stamp("9:9", 1234);
    assert_eq!(tl, before);
}

#[test]
fn fetched_timing_with_positive_durations_is_installed_verbatim() {
    let mut tl = Timeline::new();
    let fetched = vec![seg("1:1", 0, 6120), seg("1:2", 6120, 13480)];

    tl.replace_with_fetched(fetched.clone(), &[verse("1:1"), verse("1:2")]);
    assert_eq!(tl.segments(), fetched.as_slice());
}

#[test]
fn degenerate_fetched_timing_falls_back_to_uncalibrated() {
    let mut tl = Timeline::new();
    let fetched = vec![seg("1:1", 0, 0), seg("1:2", 0, 0)];

    tl.replace_with_fetched(fetched, &[verse("1:1"), verse("1:2")]);

    assert_eq!(tl.len(), 2);
    assert!(tl.segments().iter().all(|s| !s.is_calibrated()));
}

#[test]
fn empty_fetched_timing_falls_back_to_uncalibrated() {
    let mut tl = Timeline::new();
    tl.replace_with_fetched(Vec::new(), &[verse("1:1")]);
    assert_eq!(tl.len(), 1);
    assert!(!tl.segments()[0].is_calibrated());
}
