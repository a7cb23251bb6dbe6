use crate::{
    content::model::{AudioTimestamps, Verse},
    content::provider::ContentProvider,
    foundation::error::{TartilError, TartilResult},
    timeline::store::Segment,
};

/// Resource id of the standard English transliteration on the quran.com API.
const TRANSLITERATION_RESOURCE_ID: u32 = 57;

/// Blocking HTTP client for the quran.com v4 content API.
///
/// Optionally pairs with a transliteration generator (see
/// [`crate::content::gemini::GeminiTransliterator`]) to satisfy the full
/// [`ContentProvider`] surface.
pub struct QuranApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    transliterator: Option<crate::content::gemini::GeminiTransliterator>,
}

impl QuranApiClient {
    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.quran.com/api/v4";

    /// Build a client against the default base URL.
    pub fn new() -> TartilResult<Self> {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    /// Build a client against a custom base URL (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> TartilResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| TartilError::content(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            transliterator: None,
        })
    }

    /// Attach an AI transliteration generator.
    pub fn with_transliterator(
        mut self,
        transliterator: crate::content::gemini::GeminiTransliterator,
    ) -> Self {
        self.transliterator = Some(transliterator);
        self
    }

    fn get_json(&self, url: &str) -> TartilResult<serde_json::Value> {
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| TartilError::content(format!("request to '{url}' failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(TartilError::content(format!(
                "request to '{url}' returned status {}",
                resp.status()
            )));
        }
        resp.json()
            .map_err(|e| TartilError::content(format!("invalid json from '{url}': {e}")))
    }

    /// Reconstruct per-verse timing from individual verse audio durations
    /// when the chapter recitation carries no explicit verse timings.
    fn reconstruct_timestamps(&self, reciter_id: u32, chapter_id: u32) -> TartilResult<Vec<Segment>> {
        #[derive(serde::Deserialize)]
        struct VerseAudio {
            duration: Option<f64>,
        }
        #[derive(serde::Deserialize)]
        struct VerseEntry {
            verse_key: String,
            audio: Option<VerseAudio>,
        }
        #[derive(serde::Deserialize)]
        struct VersesOut {
            verses: Vec<VerseEntry>,
        }

        let url = format!(
            "{}/verses/by_chapter/{chapter_id}?audio={reciter_id}&per_page=286&fields=verse_key",
            self.base_url
        );
        let parsed: VersesOut = serde_json::from_value(self.get_json(&url)?)
            .map_err(|e| TartilError::content(format!("verse audio parse failed: {e}")))?;

        let mut current_ms = 0u64;
        let mut out = Vec::with_capacity(parsed.verses.len());
        for v in parsed.verses {
            let duration_ms = v
                .audio
                .and_then(|a| a.duration)
                .map(|d| (d * 1000.0).max(0.0) as u64)
                .unwrap_or(0);
            out.push(Segment {
                verse_key: v.verse_key,
                timestamp_from: current_ms,
                timestamp_to: current_ms + duration_ms,
                duration: duration_ms as i64,
            });
            current_ms += duration_ms;
        }
        Ok(out)
    }
}

impl ContentProvider for QuranApiClient {
    #[tracing::instrument(skip(self))]
    fn fetch_verses(&self, chapter_id: u32, translation_id: u32) -> TartilResult<Vec<Verse>> {
        #[derive(serde::Deserialize)]
        struct TranslationEntry {
            resource_id: u32,
            text: String,
        }
        #[derive(serde::Deserialize)]
        struct VerseEntry {
            verse_key: String,
            text_uthmani: String,
            #[serde(default)]
            translations: Vec<TranslationEntry>,
        }
        #[derive(serde::Deserialize)]
        struct VersesOut {
            verses: Vec<VerseEntry>,
        }

        let url = format!(
            "{}/verses/by_chapter/{chapter_id}?words=false&translations={translation_id},{TRANSLITERATION_RESOURCE_ID}&fields=text_uthmani&per_page=286",
            self.base_url
        );
        let parsed: VersesOut = serde_json::from_value(self.get_json(&url)?)
            .map_err(|e| TartilError::content(format!("verse list parse failed: {e}")))?;

        Ok(parsed
            .verses
            .into_iter()
            .map(|v| {
                let translation_text = v
                    .translations
                    .iter()
                    .find(|t| t.resource_id == translation_id)
                    .or_else(|| {
                        // Fallback: any non-transliteration resource.
                        v.translations
                            .iter()
                            .find(|t| t.resource_id != TRANSLITERATION_RESOURCE_ID)
                    })
                    .map(|t| t.text.clone())
                    .unwrap_or_default();

                let transliteration_text = v
                    .translations
                    .iter()
                    .find(|t| t.resource_id == TRANSLITERATION_RESOURCE_ID)
                    .map(|t| strip_html_tags(&t.text))
                    .filter(|t| !t.is_empty());

                Verse {
                    verse_key: v.verse_key,
                    primary_text: v.text_uthmani,
                    translation_text,
                    transliteration_text,
                }
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    fn fetch_audio_and_timestamps(
        &self,
        reciter_id: u32,
        chapter_id: u32,
    ) -> TartilResult<AudioTimestamps> {
        #[derive(serde::Deserialize)]
        struct AudioFile {
            audio_url: String,
            #[serde(default)]
            verse_timings: Vec<Segment>,
        }
        #[derive(serde::Deserialize)]
        struct RecitationOut {
            audio_file: Option<AudioFile>,
        }

        let url = format!(
            "{}/chapter_recitations/{reciter_id}/{chapter_id}",
            self.base_url
        );
        let parsed: RecitationOut = serde_json::from_value(self.get_json(&url)?)
            .map_err(|e| TartilError::content(format!("recitation parse failed: {e}")))?;
        let audio_file = parsed
            .audio_file
            .ok_or_else(|| TartilError::content("audio file not found for recitation"))?;

        let timestamps = if !audio_file.verse_timings.is_empty() {
            audio_file.verse_timings
        } else {
            // Best-effort reconstruction; timing absence is not a hard error.
            match self.reconstruct_timestamps(reciter_id, chapter_id) {
                Ok(ts) => ts,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to reconstruct verse timings");
                    Vec::new()
                }
            }
        };

        Ok(AudioTimestamps {
            audio_url: audio_file.audio_url,
            timestamps,
        })
    }

    fn fetch_transliteration(
        &self,
        arabic_text: &str,
        target_language: &str,
    ) -> TartilResult<String> {
        let Some(transliterator) = &self.transliterator else {
            return Err(TartilError::content(
                "no transliteration generator configured",
            ));
        };
        transliterator.generate(arabic_text, target_language)
    }
}

/// Remove HTML tags (`<...>`) from collaborator-supplied text, keeping the
/// text content between them.
pub fn strip_html_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
