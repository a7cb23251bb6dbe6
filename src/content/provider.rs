use crate::{
    content::model::{AudioTimestamps, Verse},
    foundation::error::TartilResult,
};

/// Remote content collaborator consumed by the session controller.
///
/// All calls are synchronous and return explicit result-or-error outcomes;
/// the engine never retries or times out on its own, the caller decides.
pub trait ContentProvider {
    /// Fetch the verse list for a chapter under a specific translation.
    fn fetch_verses(&self, chapter_id: u32, translation_id: u32) -> TartilResult<Vec<Verse>>;

    /// Fetch the recitation audio URL and any machine-supplied timing.
    fn fetch_audio_and_timestamps(
        &self,
        reciter_id: u32,
        chapter_id: u32,
    ) -> TartilResult<AudioTimestamps>;

    /// Generate a phonetic transliteration of `arabic_text` into the
    /// alphabet of `target_language`. Best-effort: callers treat failures
    /// as non-fatal.
    fn fetch_transliteration(&self, arabic_text: &str, target_language: &str)
    -> TartilResult<String>;
}
