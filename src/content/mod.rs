/// Gemini-backed phonetic transliteration generator.
pub mod gemini;
/// Verse and audio data types exchanged with collaborators.
pub mod model;
/// The `ContentProvider` trait consumed by the session controller.
pub mod provider;
/// Blocking client for the quran.com v4 content API.
pub mod quran_api;
