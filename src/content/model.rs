use crate::timeline::store::Segment;

/// A single verse as supplied by the content collaborator.
///
/// Verses are read-only from the engine's viewpoint; only the report apply
/// path may overwrite translation text, and transliteration overrides live
/// in the session's override map rather than here.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Verse {
    /// Unique key in `"<chapter>:<number>"` form.
    pub verse_key: String,
    /// Primary (Arabic, right-to-left) text.
    pub primary_text: String,
    /// Translation in the selected target language.
    pub translation_text: String,
    /// Built-in transliteration, when the collaborator supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration_text: Option<String>,
}

/// Audio location plus machine-supplied initial timing for a chapter.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AudioTimestamps {
    /// URL of the continuous recitation audio.
    pub audio_url: String,
    /// Per-verse timing; may be empty or entirely zero-duration, in which
    /// case the store falls back to uncalibrated defaults.
    pub timestamps: Vec<Segment>,
}
