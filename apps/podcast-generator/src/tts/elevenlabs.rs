//! ElevenLabs `/text-to-speech/{voice}` adapter

use reqwest::Client as HttpClient;
use serde::Serialize;

use super::{http_client, SpeechSynthesizer, TtsProvider};
use crate::chat::upstream_error_message;
use crate::config::TtsConfig;
use crate::error::{GeneratorError, Result};

/// Premade voice names and their public voice ids
const PREMADE_VOICES: &[(&str, &str)] = &[
    ("Rachel", "21m00Tcm4TlvDq8ikWAM"),
    ("Domi", "AZnzlk1XvdvUeBnXmlld"),
    ("Bella", "EXAVITQu4vr4xnSDxMaL"),
    ("Antoni", "ErXwobaYiN019PkySvjV"),
    ("Josh", "TxGEqnHWrfWFTfGW9XjX"),
    ("Arnold", "VR6AewLTigWG4xSOukaa"),
    ("Adam", "pNInz6obpgDQGcFmaJgB"),
    ("Sam", "yoZ06aMxZJJ28mfd3POQ"),
];

/// Voice id for a premade name; anything else is taken to be an id already
pub fn voice_id(voice: &str) -> &str {
    PREMADE_VOICES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(voice))
        .map(|(_, id)| *id)
        .unwrap_or(voice)
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

pub struct ElevenLabsSpeech {
    api_key: String,
    api_url: String,
    model: String,
    client: HttpClient,
}

impl ElevenLabsSpeech {
    pub fn new(config: &TtsConfig, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_url: config.elevenlabs_api_url.trim_end_matches('/').to_string(),
            model: config.elevenlabs_model.clone(),
            client: http_client(config.timeout_secs),
        }
    }

    fn endpoint(&self, voice: &str) -> String {
        format!(
            "{}/text-to-speech/{}?output_format=mp3_44100_128",
            self.api_url,
            voice_id(voice)
        )
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for ElevenLabsSpeech {
    fn provider(&self) -> TtsProvider {
        TtsProvider::ElevenLabs
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        let body = SpeechRequest {
            text,
            model_id: &self.model,
        };

        let response = self
            .client
            .post(self.endpoint(voice))
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::speech(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            ::log::error!("ElevenLabs error ({}): {}", status, text);
            return Err(GeneratorError::speech(upstream_error_message(status, &text)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GeneratorError::speech(format!("TTS response read failed: {}", e)))?;
        Ok(bytes.to_vec())
    }
}
