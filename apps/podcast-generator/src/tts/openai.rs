//! OpenAI `/audio/speech` adapter

use reqwest::Client as HttpClient;
use serde::Serialize;

use super::{http_client, SpeechSynthesizer, TtsProvider};
use crate::chat::upstream_error_message;
use crate::config::TtsConfig;
use crate::error::{GeneratorError, Result};

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

pub struct OpenaiSpeech {
    api_key: String,
    api_url: String,
    model: String,
    client: HttpClient,
}

impl OpenaiSpeech {
    pub fn new(config: &TtsConfig, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_url: config.openai_api_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
            client: http_client(config.timeout_secs),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/speech", self.api_url)
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for OpenaiSpeech {
    fn provider(&self) -> TtsProvider {
        TtsProvider::OpenAi
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        let body = SpeechRequest {
            model: &self.model,
            voice,
            input: text,
            response_format: "mp3",
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::speech(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            ::log::error!("OpenAI TTS error ({}): {}", status, text);
            return Err(GeneratorError::speech(upstream_error_message(status, &text)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GeneratorError::speech(format!("TTS response read failed: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let body = SpeechRequest {
            model: "tts-1-hd",
            voice: "echo",
            input: "Hello there",
            response_format: "mp3",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "tts-1-hd",
                "voice": "echo",
                "input": "Hello there",
                "response_format": "mp3"
            })
        );
    }

    #[test]
    fn test_defaults_from_config() {
        let speech = OpenaiSpeech::new(&TtsConfig::default(), "sk-test");
        assert_eq!(speech.model, "tts-1-hd");
        assert_eq!(speech.endpoint(), "https://api.openai.com/v1/audio/speech");
        assert_eq!(speech.provider().supported_tags(), &["break", "emphasis"]);
    }
}
