//! Google Cloud Text-to-Speech synthesizer.
//!
//! Calls `text:synthesize` and returns the decoded MP3 payload.

use super::{ProviderError, SpeechSynthesizer};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TTS_API_BASE: &str = "https://texttospeech.googleapis.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Regions used when the caller passes a bare language code such as `en`.
const DEFAULT_REGIONS: &[(&str, &str)] = &[
    ("ar", "ar-XA"),
    ("bn", "bn-IN"),
    ("de", "de-DE"),
    ("en", "en-US"),
    ("es", "es-ES"),
    ("fr", "fr-FR"),
    ("gu", "gu-IN"),
    ("hi", "hi-IN"),
    ("it", "it-IT"),
    ("ja", "ja-JP"),
    ("kn", "kn-IN"),
    ("ko", "ko-KR"),
    ("ml", "ml-IN"),
    ("mr", "mr-IN"),
    ("pt", "pt-BR"),
    ("ru", "ru-RU"),
    ("ta", "ta-IN"),
    ("te", "te-IN"),
    ("zh", "cmn-CN"),
];

#[derive(Debug, Clone)]
pub struct GoogleTtsConfig {
    pub api_key: Secret<String>,
}

pub struct GoogleSpeechSynthesizer {
    config: GoogleTtsConfig,
    client: Client,
}

impl GoogleSpeechSynthesizer {
    pub fn new(config: GoogleTtsConfig) -> Result<Self, ProviderError> {
        if config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Google API key not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

/// Normalise `lang` into a BCP-47 tag the API accepts.
fn language_code(lang: &str) -> String {
    let lang = lang.trim().replace('_', "-");
    if lang.contains('-') {
        return lang;
    }

    let lower = lang.to_lowercase();
    DEFAULT_REGIONS
        .iter()
        .find(|(code, _)| *code == lower)
        .map(|(_, tag)| tag.to_string())
        .unwrap_or(lower)
}

/// `male`/`female`/`neutral` pick a gender; anything else names a specific voice.
fn voice_selection(lang: &str, voice: &str) -> VoiceSelectionParams {
    let language_code = language_code(lang);
    let gender = match voice.trim().to_lowercase().as_str() {
        "male" => Some("MALE"),
        "female" => Some("FEMALE"),
        "neutral" => Some("NEUTRAL"),
        _ => None,
    };

    match gender {
        Some(gender) => VoiceSelectionParams {
            language_code,
            ssml_gender: Some(gender.to_string()),
            name: None,
        },
        None => VoiceSelectionParams {
            language_code,
            ssml_gender: None,
            name: Some(voice.trim().to_string()),
        },
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeechSynthesizer {
    async fn text_to_speech(
        &self,
        text: &str,
        lang: &str,
        voice: &str,
    ) -> Result<Vec<u8>, ProviderError> {
        if text.trim().is_empty() {
            return Err(ProviderError::InvalidRequest(
                "Text to synthesize is empty".to_string(),
            ));
        }

        let request = SynthesizeRequest {
            input: SynthesisInput {
                text: text.to_string(),
            },
            voice: voice_selection(lang, voice),
            audio_config: AudioConfig {
                audio_encoding: "MP3".to_string(),
            },
        };

        tracing::debug!(
            text_len = text.len(),
            language_code = %request.voice.language_code,
            "Sending request to Google Text-to-Speech"
        );

        let response = self
            .client
            .post(format!("{}/text:synthesize", TTS_API_BASE))
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Text-to-Speech API error {}: {}",
                status, error_text
            )));
        }

        let body: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let audio = BASE64
            .decode(body.audio_content.as_bytes())
            .map_err(|e| ProviderError::ApiError(format!("Invalid audio payload: {}", e)))?;

        if audio.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(audio)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest {
    input: SynthesisInput,
    voice: VoiceSelectionParams,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput {
    text: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct VoiceSelectionParams {
    language_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ssml_gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_language_codes_get_a_default_region() {
        assert_eq!(language_code("en"), "en-US");
        assert_eq!(language_code("HI"), "hi-IN");
        assert_eq!(language_code("en_GB"), "en-GB");
        assert_eq!(language_code("pt-PT"), "pt-PT");
        assert_eq!(language_code("sw"), "sw");
    }

    #[test]
    fn gender_keywords_select_ssml_gender() {
        let selection = voice_selection("en", "Male");
        assert_eq!(selection.ssml_gender.as_deref(), Some("MALE"));
        assert_eq!(selection.name, None);

        let selection = voice_selection("en", "female");
        assert_eq!(selection.ssml_gender.as_deref(), Some("FEMALE"));
    }

    #[test]
    fn other_voice_values_are_voice_names() {
        let selection = voice_selection("en-GB", "en-GB-Neural2-B");
        assert_eq!(
            selection,
            VoiceSelectionParams {
                language_code: "en-GB".to_string(),
                ssml_gender: None,
                name: Some("en-GB-Neural2-B".to_string()),
            }
        );
    }

    #[test]
    fn request_body_uses_mp3_encoding() {
        let request = SynthesizeRequest {
            input: SynthesisInput {
                text: "Good luck with the interview".to_string(),
            },
            voice: voice_selection("en", "male"),
            audio_config: AudioConfig {
                audio_encoding: "MP3".to_string(),
            },
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["audioConfig"]["audioEncoding"], "MP3");
        assert_eq!(body["voice"]["languageCode"], "en-US");
        assert_eq!(body["voice"]["ssmlGender"], "MALE");
        assert_eq!(body["input"]["text"], "Good luck with the interview");
    }
}
