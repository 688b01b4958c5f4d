//! Speech synthesis - provider catalog, adapters and conversation rendering
//!
//! A transcript is split into host/guest turns, each turn is synthesized with
//! the matching voice, and the encoded MP3 responses are concatenated in turn
//! order into `<output_dir>/podcast.mp3`.

pub mod edge;
pub mod elevenlabs;
pub mod gemini;
pub mod openai;

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::config::{Credential, GeneratorConfig};
use crate::error::{GeneratorError, Result};
use crate::turns::{SpeakerTag, TranscriptSegment, TurnFormatter};

pub use edge::EdgeSpeech;
pub use elevenlabs::ElevenLabsSpeech;
pub use gemini::{GeminiMultiSpeech, GeminiSpeech};
pub use openai::OpenaiSpeech;

/// Fixed name of the rendered podcast inside the output directory
pub const OUTPUT_FILE_NAME: &str = "podcast.mp3";

/// SSML tags every provider accepts
pub const COMMON_SSML_TAGS: &[&str] = &["lang", "p", "phoneme", "s", "sub"];

/// OpenAI replaces the common set with its own
pub const OPENAI_SSML_TAGS: &[&str] = &["break", "emphasis"];

// ============================================================================
// PROVIDER CATALOG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "elevenlabs")]
    ElevenLabs,
    Edge,
    Gemini,
    #[serde(rename = "geminimulti")]
    GeminiMulti,
}

impl TtsProvider {
    pub const ALL: [TtsProvider; 5] = [
        TtsProvider::OpenAi,
        TtsProvider::ElevenLabs,
        TtsProvider::Edge,
        TtsProvider::Gemini,
        TtsProvider::GeminiMulti,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            TtsProvider::OpenAi => "openai",
            TtsProvider::ElevenLabs => "elevenlabs",
            TtsProvider::Edge => "edge",
            TtsProvider::Gemini => "gemini",
            TtsProvider::GeminiMulti => "geminimulti",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.id().eq_ignore_ascii_case(id.trim()))
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    pub fn voices(&self) -> &'static [&'static str] {
        match self {
            TtsProvider::OpenAi => &["alloy", "echo", "fable", "onyx", "nova", "shimmer"],
            TtsProvider::ElevenLabs => {
                &["Rachel", "Domi", "Bella", "Antoni", "Josh", "Arnold", "Adam", "Sam"]
            }
            TtsProvider::Edge => &[
                "en-US-JennyNeural",
                "en-US-GuyNeural",
                "en-US-AriaNeural",
                "en-US-DavisNeural",
            ],
            TtsProvider::Gemini => &["en-US-Journey-D", "en-US-Journey-F", "en-US-Journey-O"],
            TtsProvider::GeminiMulti => &["R", "S", "T", "U"],
        }
    }

    pub fn supported_tags(&self) -> &'static [&'static str] {
        match self {
            TtsProvider::OpenAi => OPENAI_SSML_TAGS,
            _ => COMMON_SSML_TAGS,
        }
    }

    /// API key the provider needs, if any
    pub fn credential(&self) -> Option<Credential> {
        match self {
            TtsProvider::OpenAi => Some(Credential::OpenAi),
            TtsProvider::ElevenLabs => Some(Credential::ElevenLabs),
            TtsProvider::Edge => None,
            TtsProvider::Gemini | TtsProvider::GeminiMulti => Some(Credential::Gemini),
        }
    }
}

/// Host and guest voice for one render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSelection {
    pub host: String,
    pub guest: String,
}

impl Default for VoiceSelection {
    fn default() -> Self {
        Self {
            host: "echo".to_string(),
            guest: "shimmer".to_string(),
        }
    }
}

impl VoiceSelection {
    /// Keep voices the provider offers; otherwise host takes the first
    /// voice and guest the second.
    pub fn for_provider(provider: TtsProvider, host: &str, guest: &str) -> Self {
        let voices = provider.voices();
        let first = voices.first().copied().unwrap_or_default();
        let second = voices.get(1).copied().unwrap_or(first);

        let pick = |current: &str, fallback: &str| {
            if voices.contains(&current) {
                current.to_string()
            } else {
                fallback.to_string()
            }
        };

        Self {
            host: pick(host, first),
            guest: pick(guest, second),
        }
    }

    pub fn voice_for(&self, speaker: SpeakerTag) -> &str {
        match speaker {
            SpeakerTag::Person1 => &self.host,
            SpeakerTag::Person2 => &self.guest,
        }
    }
}

// ============================================================================
// SYNTHESIZER
// ============================================================================

/// One text-to-speech backend
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn provider(&self) -> TtsProvider;

    /// Encoded MP3 for a single utterance
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>>;

    /// Encoded MP3 for a whole conversation, one request per turn by default
    async fn synthesize_segments(
        &self,
        segments: &[TranscriptSegment],
        voices: &VoiceSelection,
    ) -> Result<Vec<u8>> {
        let mut audio = Vec::new();
        for (index, segment) in segments.iter().enumerate() {
            let voice = voices.voice_for(segment.speaker);
            ::log::debug!(
                "[{}] turn {}/{} ({}, voice {})",
                self.provider().id(),
                index + 1,
                segments.len(),
                segment.speaker.as_str(),
                voice
            );
            let chunk = self.synthesize(&segment.text, voice).await?;
            audio.extend_from_slice(&chunk);
        }
        Ok(audio)
    }
}

pub(crate) fn http_client(timeout_secs: u64) -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Adapter for `provider`; fails with a configuration error when its key is absent
pub fn build_synthesizer(
    provider: TtsProvider,
    config: &GeneratorConfig,
) -> Result<Box<dyn SpeechSynthesizer>> {
    let key = |credential: Credential| config.keys.get(credential);
    let tts = &config.tts;

    let synthesizer: Box<dyn SpeechSynthesizer> = match provider {
        TtsProvider::OpenAi => Box::new(OpenaiSpeech::new(tts, key(Credential::OpenAi)?)),
        TtsProvider::ElevenLabs => {
            Box::new(ElevenLabsSpeech::new(tts, key(Credential::ElevenLabs)?))
        }
        TtsProvider::Edge => Box::new(EdgeSpeech::new(&tts.edge_command)),
        TtsProvider::Gemini => Box::new(GeminiSpeech::new(tts, key(Credential::Gemini)?)),
        TtsProvider::GeminiMulti => {
            Box::new(GeminiMultiSpeech::new(tts, key(Credential::Gemini)?))
        }
    };
    Ok(synthesizer)
}

// ============================================================================
// CONVERSATION
// ============================================================================

/// Renders a transcript into a single MP3 file
pub struct ConversationSynthesizer {
    synthesizer: Box<dyn SpeechSynthesizer>,
    formatter: TurnFormatter,
    ending_message: String,
}

impl ConversationSynthesizer {
    pub fn new(synthesizer: Box<dyn SpeechSynthesizer>, ending_message: &str) -> Result<Self> {
        let formatter = TurnFormatter::new(synthesizer.provider().supported_tags())?;
        Ok(Self {
            synthesizer,
            formatter,
            ending_message: ending_message.to_string(),
        })
    }

    pub fn segments(&self, transcript: &str) -> Result<Vec<TranscriptSegment>> {
        let segments = self.formatter.segments(transcript, &self.ending_message);
        if segments.is_empty() {
            return Err(GeneratorError::validation(
                "Transcript has no speaker turns to synthesize",
            ));
        }
        Ok(segments)
    }

    pub async fn render(&self, transcript: &str, voices: &VoiceSelection) -> Result<Vec<u8>> {
        let segments = self.segments(transcript)?;
        ::log::info!(
            "Synthesizing {} turns with {} (host {}, guest {})",
            segments.len(),
            self.synthesizer.provider().id(),
            voices.host,
            voices.guest
        );

        let audio = self.synthesizer.synthesize_segments(&segments, voices).await?;
        if audio.is_empty() {
            return Err(GeneratorError::speech("Provider returned no audio"));
        }
        Ok(audio)
    }

    /// Render and write `<output_dir>/podcast.mp3`, replacing any previous file.
    ///
    /// A failed render leaves no partial file behind.
    pub async fn write_podcast(
        &self,
        transcript: &str,
        voices: &VoiceSelection,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let audio = self.render(transcript, voices).await?;
        self.save(&audio, output_dir).await
    }

    /// Stage `audio` next to `<output_dir>/podcast.mp3` and rename it into place
    pub async fn save(&self, audio: &[u8], output_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir).await?;
        let target = output_dir.join(OUTPUT_FILE_NAME);
        let staging = output_dir.join(format!("{}.part", OUTPUT_FILE_NAME));

        let written = match tokio::fs::write(&staging, audio).await {
            Ok(()) => tokio::fs::rename(&staging, &target).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        ::log::info!("Wrote {} bytes to {}", audio.len(), target.display());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Returns `[voice:text]` for every call and records it
    struct MockSynthesizer {
        provider: TtsProvider,
        calls: Arc<Mutex<Vec<(String, String)>>>,
        fail_on_call: Option<usize>,
    }

    impl MockSynthesizer {
        fn new(provider: TtsProvider) -> (Self, Arc<Mutex<Vec<(String, String)>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let mock = Self {
                provider,
                calls: calls.clone(),
                fail_on_call: None,
            };
            (mock, calls)
        }
    }

    #[async_trait::async_trait]
    impl SpeechSynthesizer for MockSynthesizer {
        fn provider(&self) -> TtsProvider {
            self.provider
        }

        async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
            let mut calls = self.calls.lock();
            if self.fail_on_call == Some(calls.len()) {
                return Err(GeneratorError::speech("quota exceeded"));
            }
            calls.push((voice.to_string(), text.to_string()));
            Ok(format!("[{}:{}]", voice, text).into_bytes())
        }
    }

    #[tokio::test]
    async fn test_turns_use_host_and_guest_voices_in_order() {
        let (mock, calls) = MockSynthesizer::new(TtsProvider::OpenAi);
        let conversation = ConversationSynthesizer::new(Box::new(mock), "bye").unwrap();
        let voices = VoiceSelection::default();

        let audio = conversation
            .render("Welcome!\nThanks for having me.\nLet's start.", &voices)
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(audio).unwrap(),
            "[echo:Welcome!][shimmer:Thanks for having me.][echo:Let's start.][shimmer:bye]"
        );
        assert_eq!(calls.lock().len(), 4);
    }

    #[tokio::test]
    async fn test_write_podcast_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("nested").join("output");
        let (mock, _) = MockSynthesizer::new(TtsProvider::Edge);
        let conversation = ConversationSynthesizer::new(Box::new(mock), "").unwrap();
        let voices = VoiceSelection::for_provider(TtsProvider::Edge, "echo", "shimmer");

        let path = conversation
            .write_podcast("Hi\nHello", &voices, &output_dir)
            .await
            .unwrap();

        assert_eq!(path, output_dir.join("podcast.mp3"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "[en-US-JennyNeural:Hi][en-US-GuyNeural:Hello]");
        assert!(!output_dir.join("podcast.mp3.part").exists());
    }

    #[tokio::test]
    async fn test_failed_render_keeps_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut mock, _) = MockSynthesizer::new(TtsProvider::OpenAi);
        mock.fail_on_call = Some(1);
        let conversation = ConversationSynthesizer::new(Box::new(mock), "").unwrap();

        let err = conversation
            .write_podcast("one\ntwo\nthree", &VoiceSelection::default(), dir.path())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "speech synthesis failed: quota exceeded");
        assert!(!dir.path().join("podcast.mp3").exists());
        assert!(!dir.path().join("podcast.mp3.part").exists());
    }

    #[tokio::test]
    async fn test_empty_transcript_is_rejected() {
        let (mock, calls) = MockSynthesizer::new(TtsProvider::OpenAi);
        let conversation = ConversationSynthesizer::new(Box::new(mock), "").unwrap();

        let err = conversation
            .render(" \n\n ", &VoiceSelection::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Validation(_)));
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_voice_fallback_on_provider_switch() {
        let kept = VoiceSelection::for_provider(TtsProvider::OpenAi, "nova", "onyx");
        assert_eq!(kept.host, "nova");
        assert_eq!(kept.guest, "onyx");

        let switched = VoiceSelection::for_provider(TtsProvider::ElevenLabs, "nova", "onyx");
        assert_eq!(switched.host, "Rachel");
        assert_eq!(switched.guest, "Domi");

        let partial = VoiceSelection::for_provider(TtsProvider::GeminiMulti, "T", "shimmer");
        assert_eq!(partial.host, "T");
        assert_eq!(partial.guest, "S");
    }

    #[test]
    fn test_provider_ids_round_trip() {
        for provider in TtsProvider::ALL {
            assert_eq!(TtsProvider::from_id(provider.id()), Some(provider));
            assert_eq!(TtsProvider::from_index(provider.index()), provider);
        }
        assert_eq!(TtsProvider::from_id("GeminiMulti"), Some(TtsProvider::GeminiMulti));
        assert_eq!(TtsProvider::from_id("azure"), None);
    }

    #[test]
    fn test_supported_tags_per_provider() {
        assert_eq!(TtsProvider::OpenAi.supported_tags(), &["break", "emphasis"]);
        assert_eq!(TtsProvider::Gemini.supported_tags(), COMMON_SSML_TAGS);
        assert_eq!(TtsProvider::Edge.credential(), None);
    }

    #[test]
    fn test_build_synthesizer_requires_key() {
        let mut config = GeneratorConfig::default();
        config.keys.openai = Some("sk-test-1234567890".to_string());

        assert!(build_synthesizer(TtsProvider::OpenAi, &config).is_ok());
        assert!(build_synthesizer(TtsProvider::Edge, &config).is_ok());

        let err = build_synthesizer(TtsProvider::ElevenLabs, &config).err().unwrap();
        assert!(err.to_string().contains("ELEVENLABS_API_KEY"));
    }
}
