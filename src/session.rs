//! Session controller: owns the verse list, the segment timeline and the
//! transliteration overrides for one chapter/reciter pairing, and mediates
//! every mutation the stamping and report workflows perform on them.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::{
    content::{model::Verse, provider::ContentProvider},
    foundation::error::{TartilError, TartilResult},
    report::codec,
    timeline::clock::{ActiveSegment, ClockAdapter, MediaClock},
    timeline::store::Timeline,
};

/// All mutable state of one alignment session.
///
/// Loading a chapter replaces everything; in between, the only mutation
/// paths are manual stamping, report application and transliteration
/// management.
#[derive(Debug, Default)]
pub struct SessionContext {
    /// Verses of the loaded chapter, in verse order.
    verses: Vec<Verse>,
    /// Per-verse segment timeline for the loaded audio.
    pub timeline: Timeline,
    /// User- or AI-supplied transliterations, keyed by verse key. Entries
    /// shadow the verse's built-in transliteration.
    overrides: BTreeMap<String, String>,
    /// Display title of the loaded chapter.
    pub chapter_title: String,
    /// Display name of the selected reciter.
    pub reciter_name: String,
    /// Download URL of the recitation audio, when one was resolved.
    audio_url: Option<String>,
}

impl SessionContext {
    /// An empty session with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Verses of the loaded chapter.
    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    /// Look up a loaded verse by key.
    pub fn verse(&self, verse_key: &str) -> Option<&Verse> {
        self.verses.iter().find(|v| v.verse_key == verse_key)
    }

    /// Resolved recitation audio URL, if any.
    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }

    /// Current transliteration overrides.
    pub fn transliteration_overrides(&self) -> &BTreeMap<String, String> {
        &self.overrides
    }

    /// Load a chapter and its recitation timing, replacing all session
    /// state.
    ///
    /// A verse fetch failure empties the session and is fatal. An audio or
    /// timing fetch failure is not: the session stays usable for manual
    /// stamping against an uncalibrated timeline.
    #[tracing::instrument(skip(self, provider))]
    pub fn load_chapter(
        &mut self,
        provider: &dyn ContentProvider,
        chapter_id: u32,
        translation_id: u32,
        reciter_id: u32,
        chapter_title: impl Into<String> + std::fmt::Debug,
        reciter_name: impl Into<String> + std::fmt::Debug,
    ) -> TartilResult<()> {
        let verses = match provider.fetch_verses(chapter_id, translation_id) {
            Ok(verses) => verses,
            Err(e) => {
                self.verses.clear();
                self.timeline.clear();
                self.overrides.clear();
                self.chapter_title.clear();
                self.reciter_name.clear();
                self.audio_url = None;
                return Err(e);
            }
        };

        self.chapter_title = chapter_title.into();
        self.reciter_name = reciter_name.into();
        self.overrides.clear();

        match provider.fetch_audio_and_timestamps(reciter_id, chapter_id) {
            Ok(audio) => {
                self.audio_url = Some(audio.audio_url);
                self.timeline.replace_with_fetched(audio.timestamps, &verses);
            }
            Err(e) => {
                warn!(error = %e, "audio timing fetch failed, starting uncalibrated");
                self.audio_url = None;
                self.timeline.replace(&verses);
            }
        }

        self.verses = verses;
        Ok(())
    }

    /// Close a verse boundary at an explicit time in milliseconds.
    pub fn stamp(&mut self, verse_key: &str, current_time: u64) {
        self.timeline.stamp(verse_key, current_time);
    }

    /// Close a verse boundary at the clock's current position.
    pub fn stamp_at(&mut self, verse_key: &str, clock: &dyn MediaClock) {
        self.stamp(verse_key, ClockAdapter::current_time_ms(clock));
    }

    /// Active segment for a playback position in milliseconds.
    pub fn active_segment(&self, current_time: u64) -> Option<ActiveSegment<'_>> {
        ClockAdapter::resolve_active(&self.timeline, current_time)
    }

    /// Transliteration shown for a verse: the override when one exists,
    /// otherwise the verse's own non-empty transliteration.
    pub fn transliteration_for(&self, verse_key: &str) -> Option<&str> {
        self.overrides
            .get(verse_key)
            .map(String::as_str)
            .or_else(|| {
                self.verse(verse_key)
                    .and_then(|v| v.transliteration_text.as_deref())
            })
            .filter(|t| !t.is_empty())
    }

    /// Serialize the session into the canonical timestamp report.
    pub fn report(&self) -> String {
        codec::generate(
            &self.timeline,
            &self.verses,
            &self.overrides,
            &format!("Sure: {}", self.chapter_title),
        )
    }

    /// Apply an edited report back onto the session.
    ///
    /// Each recognized block overwrites its segment's bounds and, when the
    /// corresponding lines were present, the verse translation and the
    /// transliteration override. Blocks whose key matches no loaded verse
    /// segment are dropped. A report with zero recognizable blocks is a
    /// format error and leaves the session untouched.
    pub fn apply_report(&mut self, text: &str) -> TartilResult<usize> {
        let blocks = codec::parse(text);
        if blocks.is_empty() {
            return Err(TartilError::report(
                "no timestamp blocks recognized in report text",
            ));
        }

        let mut applied = 0usize;
        for block in blocks {
            let Some(seg) = self.timeline.lookup_mut(&block.verse_key) else {
                debug!(verse_key = %block.verse_key, "report block matches no segment, dropped");
                continue;
            };
            seg.timestamp_from = block.timestamp_from;
            seg.timestamp_to = block.timestamp_to;
            seg.duration = block.timestamp_to as i64 - block.timestamp_from as i64;

            if let Some(translation) = block.translation
                && let Some(verse) = self
                    .verses
                    .iter_mut()
                    .find(|v| v.verse_key == block.verse_key)
            {
                verse.translation_text = translation;
            }
            if let Some(transliteration) = block.transliteration {
                self.overrides.insert(block.verse_key, transliteration);
            }
            applied += 1;
        }
        Ok(applied)
    }

    /// Store a transliteration override for a loaded verse.
    pub fn set_transliteration(
        &mut self,
        verse_key: &str,
        text: impl Into<String>,
    ) -> TartilResult<()> {
        if self.verse(verse_key).is_none() {
            return Err(TartilError::validation(format!(
                "no loaded verse with key '{verse_key}'"
            )));
        }
        self.overrides.insert(verse_key.to_string(), text.into());
        Ok(())
    }

    /// Generate a transliteration for one verse through the provider and
    /// store it as an override.
    pub fn generate_transliteration(
        &mut self,
        provider: &dyn ContentProvider,
        verse_key: &str,
        target_language: &str,
    ) -> TartilResult<String> {
        let verse = self.verse(verse_key).ok_or_else(|| {
            TartilError::validation(format!("no loaded verse with key '{verse_key}'"))
        })?;
        let text = provider.fetch_transliteration(&verse.primary_text, target_language)?;
        self.overrides.insert(verse_key.to_string(), text.clone());
        Ok(text)
    }

    /// Import pasted transliteration text, one verse per non-empty line in
    /// verse order. Leading `1.` / `1)` enumeration prefixes are stripped.
    /// Returns the number of verses that received an override.
    pub fn apply_transliteration_lines(&mut self, text: &str) -> TartilResult<usize> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(TartilError::validation(
                "transliteration import text contains no lines",
            ));
        }

        let count = lines.len().min(self.verses.len());
        if lines.len() != self.verses.len() {
            warn!(
                lines = lines.len(),
                verses = self.verses.len(),
                "transliteration line count differs from verse count, mapping positionally"
            );
        }
        for (verse, line) in self.verses.iter().zip(&lines) {
            self.overrides
                .insert(verse.verse_key.clone(), strip_line_number(line).to_string());
        }
        Ok(count)
    }
}

/// Strip a leading `<n>.` or `<n>)` enumeration prefix from a pasted line.
fn strip_line_number(line: &str) -> &str {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return line;
    }
    match line[digits..].strip_prefix(['.', ')']) {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
