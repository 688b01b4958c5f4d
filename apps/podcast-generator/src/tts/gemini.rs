//! Google Cloud Text-to-Speech adapters
//!
//! `GeminiSpeech` sends one request per turn with a Journey voice.
//! `GeminiMultiSpeech` sends whole stretches of the conversation as
//! multi-speaker markup, with host and guest mapped to speaker letters.

use base64::Engine as _;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::{http_client, SpeechSynthesizer, TtsProvider, VoiceSelection};
use crate::chat::upstream_error_message;
use crate::config::TtsConfig;
use crate::error::{GeneratorError, Result};
use crate::turns::TranscriptSegment;

/// Voice that renders multi-speaker markup
const MULTI_SPEAKER_VOICE: &str = "en-US-Studio-MultiSpeaker";

/// Upper bound on turn text per multi-speaker request, in bytes
const MULTI_SPEAKER_BYTE_LIMIT: usize = 4000;

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceParams<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisInput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    multi_speaker_markup: Option<MultiSpeakerMarkup<'a>>,
}

#[derive(Debug, Serialize)]
struct MultiSpeakerMarkup<'a> {
    turns: Vec<MarkupTurn<'a>>,
}

#[derive(Debug, Serialize)]
struct MarkupTurn<'a> {
    text: &'a str,
    speaker: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceParams<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { audio_encoding: "MP3" }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// `en-US-Journey-D` -> `en-US`; anything shorter defaults to `en-US`
fn language_code(voice: &str) -> &str {
    let mut dashes = voice.match_indices('-').map(|(i, _)| i);
    match (dashes.next(), dashes.next()) {
        (Some(_), Some(second)) => &voice[..second],
        _ => "en-US",
    }
}

fn decode_audio(body: &str) -> Result<Vec<u8>> {
    let response: SynthesizeResponse = serde_json::from_str(body)
        .map_err(|e| GeneratorError::speech(format!("Failed to parse TTS response: {}", e)))?;
    base64::engine::general_purpose::STANDARD
        .decode(response.audio_content.as_bytes())
        .map_err(|e| GeneratorError::speech(format!("Invalid audio content: {}", e)))
}

/// Shared `text:synthesize` transport
struct GoogleTts {
    api_key: String,
    api_url: String,
    client: HttpClient,
}

impl GoogleTts {
    fn new(config: &TtsConfig, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_url: config.gemini_api_url.trim_end_matches('/').to_string(),
            client: http_client(config.timeout_secs),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/text:synthesize", self.api_url)
    }

    async fn post(&self, request: &SynthesizeRequest<'_>) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| GeneratorError::speech(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GeneratorError::speech(e.without_url().to_string()))?;

        if !status.is_success() {
            ::log::error!("Google TTS error ({}): {}", status, body);
            return Err(GeneratorError::speech(upstream_error_message(status, &body)));
        }
        decode_audio(&body)
    }
}

// ============================================================================
// SINGLE SPEAKER
// ============================================================================

pub struct GeminiSpeech {
    transport: GoogleTts,
}

impl GeminiSpeech {
    pub fn new(config: &TtsConfig, api_key: &str) -> Self {
        Self {
            transport: GoogleTts::new(config, api_key),
        }
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for GeminiSpeech {
    fn provider(&self) -> TtsProvider {
        TtsProvider::Gemini
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        let request = SynthesizeRequest {
            input: SynthesisInput {
                text: Some(text),
                multi_speaker_markup: None,
            },
            voice: VoiceParams {
                language_code: language_code(voice),
                name: voice,
            },
            audio_config: AudioConfig::default(),
        };
        self.transport.post(&request).await
    }
}

// ============================================================================
// MULTI SPEAKER
// ============================================================================

pub struct GeminiMultiSpeech {
    transport: GoogleTts,
}

impl GeminiMultiSpeech {
    pub fn new(config: &TtsConfig, api_key: &str) -> Self {
        Self {
            transport: GoogleTts::new(config, api_key),
        }
    }

    fn request<'a>(turns: Vec<MarkupTurn<'a>>) -> SynthesizeRequest<'a> {
        SynthesizeRequest {
            input: SynthesisInput {
                text: None,
                multi_speaker_markup: Some(MultiSpeakerMarkup { turns }),
            },
            voice: VoiceParams {
                language_code: "en-US",
                name: MULTI_SPEAKER_VOICE,
            },
            audio_config: AudioConfig::default(),
        }
    }
}

/// Group consecutive turns so each group's text stays under `limit` bytes.
/// A single oversized turn still forms its own group.
fn chunk_turns<'a>(turns: Vec<MarkupTurn<'a>>, limit: usize) -> Vec<Vec<MarkupTurn<'a>>> {
    let mut chunks: Vec<Vec<MarkupTurn<'a>>> = Vec::new();
    let mut current = Vec::new();
    let mut size = 0;

    for turn in turns {
        if !current.is_empty() && size + turn.text.len() > limit {
            chunks.push(std::mem::take(&mut current));
            size = 0;
        }
        size += turn.text.len();
        current.push(turn);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait::async_trait]
impl SpeechSynthesizer for GeminiMultiSpeech {
    fn provider(&self) -> TtsProvider {
        TtsProvider::GeminiMulti
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        let request = Self::request(vec![MarkupTurn { text, speaker: voice }]);
        self.transport.post(&request).await
    }

    async fn synthesize_segments(
        &self,
        segments: &[TranscriptSegment],
        voices: &VoiceSelection,
    ) -> Result<Vec<u8>> {
        let turns = segments
            .iter()
            .map(|segment| MarkupTurn {
                text: &segment.text,
                speaker: voices.voice_for(segment.speaker),
            })
            .collect();

        let mut audio = Vec::new();
        let chunks = chunk_turns(turns, MULTI_SPEAKER_BYTE_LIMIT);
        let total = chunks.len();
        for (index, chunk) in chunks.into_iter().enumerate() {
            ::log::debug!("[geminimulti] request {}/{} ({} turns)", index + 1, total, chunk.len());
            let request = Self::request(chunk);
            audio.extend_from_slice(&self.transport.post(&request).await?);
        }
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code_from_voice() {
        assert_eq!(language_code("en-US-Journey-D"), "en-US");
        assert_eq!(language_code("de-DE-Wavenet-A"), "de-DE");
        assert_eq!(language_code("R"), "en-US");
    }

    #[test]
    fn test_single_speaker_body() {
        let request = SynthesizeRequest {
            input: SynthesisInput {
                text: Some("Hello"),
                multi_speaker_markup: None,
            },
            voice: VoiceParams {
                language_code: "en-US",
                name: "en-US-Journey-F",
            },
            audio_config: AudioConfig::default(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "input": {"text": "Hello"},
                "voice": {"languageCode": "en-US", "name": "en-US-Journey-F"},
                "audioConfig": {"audioEncoding": "MP3"}
            })
        );
    }

    #[test]
    fn test_multi_speaker_body() {
        let request = GeminiMultiSpeech::request(vec![
            MarkupTurn { text: "Hi", speaker: "R" },
            MarkupTurn { text: "Hello", speaker: "S" },
        ]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["voice"]["name"], "en-US-Studio-MultiSpeaker");
        assert_eq!(json["input"]["multiSpeakerMarkup"]["turns"][1]["speaker"], "S");
        assert!(json["input"].get("text").is_none());
    }

    #[test]
    fn test_decode_audio() {
        let body = r#"{"audioContent": "SUQzBA=="}"#;
        assert_eq!(decode_audio(body).unwrap(), b"ID3\x04");
        assert!(decode_audio(r#"{"audioContent": "***"}"#).is_err());
    }

    #[test]
    fn test_chunk_turns_respects_limit() {
        let turns = vec![
            MarkupTurn { text: "aaaa", speaker: "R" },
            MarkupTurn { text: "bbbb", speaker: "S" },
            MarkupTurn { text: "cccccccccc", speaker: "R" },
            MarkupTurn { text: "d", speaker: "S" },
        ];
        let chunks = chunk_turns(turns, 8);
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 1, 1]);
    }
}
