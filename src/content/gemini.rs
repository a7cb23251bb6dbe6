use crate::foundation::error::{TartilError, TartilResult};

/// AI phonetic transliteration generator backed by the Gemini REST API.
///
/// Failures map to [`TartilError::Content`]; callers treat them as
/// non-fatal and keep the verse's built-in transliteration.
pub struct GeminiTransliterator {
    http: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiTransliterator {
    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str =
        "https://generativelanguage.googleapis.com/v1beta";
    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";
    /// Environment variable consulted by [`GeminiTransliterator::from_env`].
    pub const API_KEY_ENV: &'static str = "GEMINI_API_KEY";

    /// Build a generator with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> TartilResult<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(TartilError::validation("gemini api key must be non-empty"));
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| TartilError::content(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
        })
    }

    /// Build a generator from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> TartilResult<Self> {
        let key = std::env::var(Self::API_KEY_ENV)
            .map_err(|_| TartilError::content("GEMINI_API_KEY is not set"))?;
        Self::new(key)
    }

    /// Override the API base URL (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Transliterate `arabic_text` into the alphabet of `target_language`.
    #[tracing::instrument(skip(self, arabic_text))]
    pub fn generate(&self, arabic_text: &str, target_language: &str) -> TartilResult<String> {
        #[derive(serde::Serialize)]
        struct Part {
            text: String,
        }
        #[derive(serde::Serialize)]
        struct Content {
            parts: Vec<Part>,
        }
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            max_output_tokens: u32,
            temperature: f64,
        }
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Request {
            contents: Vec<Content>,
            generation_config: GenerationConfig,
        }

        #[derive(serde::Deserialize)]
        struct RespPart {
            text: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct RespContent {
            #[serde(default)]
            parts: Vec<RespPart>,
        }
        #[derive(serde::Deserialize)]
        struct Candidate {
            content: Option<RespContent>,
        }
        #[derive(serde::Deserialize)]
        struct Response {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        let request = Request {
            contents: vec![Content {
                parts: vec![Part {
                    text: transliteration_prompt(arabic_text, target_language),
                }],
            }],
            // Very low temperature for strict adherence to the alphabet rules.
            generation_config: GenerationConfig {
                max_output_tokens: 200,
                temperature: 0.1,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(|e| TartilError::content(format!("gemini request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TartilError::content(format!(
                "gemini returned status {status}"
            )));
        }

        let parsed: Response = resp
            .json()
            .map_err(|e| TartilError::content(format!("gemini response parse failed: {e}")))?;
        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TartilError::content("gemini returned no transliteration text"))?;

        Ok(text.to_string())
    }
}

/// Prompt contract for target-alphabet phonetic transliteration.
fn transliteration_prompt(arabic_text: &str, target_language: &str) -> String {
    format!(
        "Act as an expert linguist and phonetician.\n\
         Your task is to transliterate the following Quranic Arabic text into the alphabet and phonetics of \"{target_language}\".\n\
         \n\
         STRICT RULES:\n\
         1. Use ONLY the letters and special characters found in the {target_language} alphabet.\n\
         2. Do NOT use standard English/Latin transliteration (like 'sh', 'th', 'kh') unless those specific letter combinations exist and represent the same sound in {target_language}.\n\
         3. Adapt the sounds to how a native speaker of {target_language} would write them to pronounce the Arabic correctly.\n\
         \n\
         Arabic Text to Transliterate: \"{arabic_text}\"\n\
         \n\
         Return ONLY the transliterated string in {target_language}. No explanations."
    )
}
