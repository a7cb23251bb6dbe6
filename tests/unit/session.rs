use super::*;
use crate::{
    content::model::AudioTimestamps,
    timeline::store::Segment,
};

struct FakeProvider {
    fail_verses: bool,
    fail_audio: bool,
    timestamps: Vec<Segment>,
}

impl FakeProvider {
    fn new() -> Self {
        Self {
            fail_verses: false,
            fail_audio: false,
            timestamps: vec![
                Segment {
                    verse_key: "1:1".to_string(),
                    timestamp_from: 0,
                    timestamp_to: 6120,
                    duration: 6120,
                },
                Segment {
                    verse_key: "1:2".to_string(),
                    timestamp_from: 6120,
                    timestamp_to: 13480,
                    duration: 7360,
                },
            ],
        }
    }
}

impl ContentProvider for FakeProvider {
    fn fetch_verses(&self, _chapter_id: u32, _translation_id: u32) -> TartilResult<Vec<Verse>> {
        if self.fail_verses {
            return Err(TartilError::content("verses unavailable"));
        }
        Ok(vec![
            Verse {
                verse_key: "1:1".to_string(),
                primary_text: "بِسْمِ".to_string(),
                translation_text: "In the name".to_string(),
                transliteration_text: Some("Bismi".to_string()),
            },
            Verse {
                verse_key: "1:2".to_string(),
                primary_text: "ٱلْحَمْدُ".to_string(),
                translation_text: "All praise".to_string(),
                transliteration_text: None,
            },
        ])
    }

    fn fetch_audio_and_timestamps(
        &self,
        _reciter_id: u32,
        _chapter_id: u32,
    ) -> TartilResult<AudioTimestamps> {
        if self.fail_audio {
            return Err(TartilError::content("audio unavailable"));
        }
        Ok(AudioTimestamps {
            audio_url: "https://example.com/001.mp3".to_string(),
            timestamps: self.timestamps.clone(),
        })
    }

    fn fetch_transliteration(
        &self,
        arabic_text: &str,
        target_language: &str,
    ) -> TartilResult<String> {
        Ok(format!("{target_language}:{arabic_text}"))
    }
}

fn loaded_session(provider: &FakeProvider) -> SessionContext {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .try_init();
    let mut session = SessionContext::new();
    session
        .load_chapter(provider, 1, 77, 7, "Fâtiha", "Mishary")
        .unwrap();
    session
}

#[test]
fn load_chapter_installs_verses_and_fetched_timing() {
    let provider = FakeProvider::new();
    let session = loaded_session(&provider);

    assert_eq!(session.verses().len(), 2);
    assert_eq!(session.audio_url(), Some("https://example.com/001.mp3"));
    assert_eq!(session.timeline.segments(), provider.timestamps.as_slice());
    assert!(session.transliteration_overrides().is_empty());
}

#[test]
fn load_chapter_verse_failure_empties_the_session() {
    let mut provider = FakeProvider::new();
    let mut session = loaded_session(&provider);
    session.set_transliteration("1:1", "x").unwrap();

    provider.fail_verses = true;
    assert!(
        session
            .load_chapter(&provider, 1, 77, 7, "Fâtiha", "Mishary")
            .is_err()
    );
    assert!(session.verses().is_empty());
    assert!(session.timeline.is_empty());
    assert!(session.transliteration_overrides().is_empty());
    assert_eq!(session.audio_url(), None);

    // The previous chapter's titles must not survive into the empty state.
    assert!(session.chapter_title.is_empty());
    assert!(session.reciter_name.is_empty());
    assert!(!session.report().contains("Fâtiha"));
}

#[test]
fn load_chapter_audio_failure_is_not_fatal() {
    let mut provider = FakeProvider::new();
    provider.fail_audio = true;

    let session = loaded_session(&provider);
    assert_eq!(session.verses().len(), 2);
    assert_eq!(session.audio_url(), None);
    assert_eq!(session.timeline.len(), 2);
    assert!(session.timeline.segments().iter().all(|s| !s.is_calibrated()));
}

#[test]
fn degenerate_fetched_timing_starts_uncalibrated() {
    let mut provider = FakeProvider::new();
    for seg in &mut provider.timestamps {
        seg.timestamp_to = 0;
        seg.duration = 0;
    }

    let session = loaded_session(&provider);
    assert!(session.timeline.segments().iter().all(|s| !s.is_calibrated()));
}

#[test]
fn report_round_trips_through_apply() {
    let provider = FakeProvider::new();
    let mut session = loaded_session(&provider);

    let report = session.report();
    assert!(report.starts_with("ZAMAN DAMGASI RAPORU\nSure: Fâtiha\n"));

    let before = session.timeline.clone();
    let applied = session.apply_report(&report).unwrap();
    assert_eq!(applied, 2);
    assert_eq!(session.timeline, before);
}

#[test]
fn apply_report_overwrites_bounds_text_and_override() {
    let provider = FakeProvider::new();
    let mut session = loaded_session(&provider);

    let edited = "[00:00.000 -> 00:07.000] 1:1\n\
                  Okunuş: Bismillahirrahmanirrahim\n\
                  Meal: Edited translation\n\
                  \n\
                  [00:07.000 -> 00:13.480] 1:2\n";
    let applied = session.apply_report(edited).unwrap();
    assert_eq!(applied, 2);

    let first = session.timeline.lookup("1:1").unwrap();
    assert_eq!(first.timestamp_to, 7000);
    assert_eq!(first.duration, 7000);
    assert_eq!(
        session.verse("1:1").unwrap().translation_text,
        "Edited translation"
    );
    assert_eq!(
        session.transliteration_for("1:1"),
        Some("Bismillahirrahmanirrahim")
    );

    // Lines absent from the block leave their targets alone.
    assert_eq!(session.verse("1:2").unwrap().translation_text, "All praise");
    let second = session.timeline.lookup("1:2").unwrap();
    assert_eq!(second.timestamp_from, 7000);
}

#[test]
fn apply_report_drops_unmatched_keys_but_counts_applied() {
    let provider = FakeProvider::new();
    let mut session = loaded_session(&provider);

    let edited = "[00:00.000 -> 00:01.000] bismillah\n\
                  \n\
                  [00:01.000 -> 00:02.000] 1:1\n";
    assert_eq!(session.apply_report(edited).unwrap(), 1);
    assert_eq!(session.timeline.lookup("1:1").unwrap().timestamp_to, 2000);
    assert!(session.timeline.lookup("bismillah").is_none());
}

#[test]
fn apply_report_with_no_blocks_is_a_format_error() {
    let provider = FakeProvider::new();
    let mut session = loaded_session(&provider);
    let before = session.timeline.clone();

    let err = session.apply_report("not a report at all").unwrap_err();
    assert!(matches!(err, TartilError::Report(_)));
    assert_eq!(session.timeline, before);
}

#[test]
fn stamping_flows_through_to_the_report() {
    let mut provider = FakeProvider::new();
    provider.fail_audio = true;
    let mut session = loaded_session(&provider);

    session.stamp("1:1", 5000);
    assert!(session.report().contains("[00:00.000 -> 00:05.000] 1:1"));

    let active = session.active_segment(2500).unwrap();
    assert_eq!(active.segment().verse_key, "1:1");
    assert!(!active.is_pending());
}

#[test]
fn transliteration_override_shadows_verse_text() {
    let provider = FakeProvider::new();
    let mut session = loaded_session(&provider);

    assert_eq!(session.transliteration_for("1:1"), Some("Bismi"));
    assert_eq!(session.transliteration_for("1:2"), None);

    session.set_transliteration("1:1", "Override").unwrap();
    assert_eq!(session.transliteration_for("1:1"), Some("Override"));

    assert!(session.set_transliteration("9:9", "x").is_err());
}

#[test]
fn generate_transliteration_stores_the_result() {
    let provider = FakeProvider::new();
    let mut session = loaded_session(&provider);

    let text = session
        .generate_transliteration(&provider, "1:2", "Turkish")
        .unwrap();
    assert_eq!(text, "Turkish:ٱلْحَمْدُ");
    assert_eq!(session.transliteration_for("1:2"), Some(text.as_str()));

    assert!(
        session
            .generate_transliteration(&provider, "9:9", "Turkish")
            .is_err()
    );
}

#[test]
fn transliteration_lines_map_positionally_with_prefixes_stripped() {
    let provider = FakeProvider::new();
    let mut session = loaded_session(&provider);

    let imported = "1. Bismillahirrahmanirrahim\n\n2) Elhamdulillahi\nextra line\n";
    assert_eq!(session.apply_transliteration_lines(imported).unwrap(), 2);
    assert_eq!(
        session.transliteration_for("1:1"),
        Some("Bismillahirrahmanirrahim")
    );
    assert_eq!(session.transliteration_for("1:2"), Some("Elhamdulillahi"));

    assert!(session.apply_transliteration_lines("  \n \n").is_err());
}

#[test]
fn line_number_stripping_is_conservative() {
    assert_eq!(strip_line_number("1. foo"), "foo");
    assert_eq!(strip_line_number("12) bar"), "bar");
    assert_eq!(strip_line_number("3:4 is a key"), "3:4 is a key");
    assert_eq!(strip_line_number("plain"), "plain");
}
