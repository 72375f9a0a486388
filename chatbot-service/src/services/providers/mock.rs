//! Mock provider implementations for testing and offline runs.

use super::{
    FinishReason, GenerationParams, ProviderError, ProviderResponse, SpeechSynthesizer,
    TextProvider,
};
use crate::models::ChatMessage;
use async_trait::async_trait;

/// ID3v2 tag header followed by an MPEG-1 Layer III frame header.
const MP3_PREAMBLE: [u8; 14] = [
    b'I', b'D', b'3', 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFB, 0x90, 0x64,
];

/// Mock text provider for testing.
pub struct MockTextProvider {
    enabled: bool,
}

impl MockTextProvider {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        _system_prompt: Option<&str>,
        history: &[ChatMessage],
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ));
        }

        Ok(ProviderResponse {
            text: Some(format!(
                "Mock answer to: {} (context: {} messages)",
                prompt,
                history.len()
            )),
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: 10,
            finish_reason: FinishReason::Complete,
        })
    }

    fn model(&self) -> &str {
        "mock"
    }
}

/// Mock speech synthesizer returning a small MP3-framed buffer.
pub struct MockSpeechSynthesizer {
    enabled: bool,
}

impl MockSpeechSynthesizer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeechSynthesizer {
    async fn text_to_speech(
        &self,
        text: &str,
        _lang: &str,
        _voice: &str,
    ) -> Result<Vec<u8>, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock speech synthesizer not enabled".to_string(),
            ));
        }

        // Payload length tracks the text so different inputs give different audio.
        let mut audio = MP3_PREAMBLE.to_vec();
        audio.resize(MP3_PREAMBLE.len() + 64 + text.len() * 8, 0);
        Ok(audio)
    }
}
