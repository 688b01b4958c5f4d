//! Podcast Generator - turn source text into a two-voice podcast
//!
//! This app provides:
//! - Duration suggestions from the source text (structure-aware or word-count)
//! - Token budgeting from the target duration with an optional provider ceiling
//! - Transcript generation through a hosted chat-completion endpoint
//! - Host/guest speech synthesis through OpenAI, ElevenLabs, Edge or Google voices

pub mod chat;
pub mod config;
pub mod duration;
pub mod error;
pub mod generation;
pub mod preferences;
pub mod request;
pub mod screen;
pub mod token_budget;
pub mod tts;
pub mod turns;

pub use screen::{PodcastScreen, PodcastScreenWidgetRefExt};

pub use config::{GeneratorConfig, Profile};
pub use duration::{DurationEstimator, DurationSuggestion, EstimatorKind};
pub use error::{ConfigError, GeneratorError};
pub use generation::{GenerationSession, GenerationWorker, Phase};
pub use preferences::Preferences;
pub use request::{PodcastRequest, PodcastStyle, SpeakerCount};
pub use token_budget::{BudgetOutcome, ProviderCeiling, TokenBudget, TokenBudgetPolicy};
pub use tts::{TtsProvider, VoiceSelection};
pub use turns::{SpeakerTag, TranscriptSegment, TurnFormatter};

use makepad_widgets::Cx;
use podcast_widgets::{AppInfo, PodcastApp};

/// Podcast Generator app descriptor
pub struct PodcastGeneratorApp;

impl PodcastApp for PodcastGeneratorApp {
    fn info() -> AppInfo {
        AppInfo {
            name: "Podcast Generator",
            id: "podcast-generator",
            description: "Generate a podcast transcript and two-voice audio from any text",
        }
    }

    fn live_design(cx: &mut Cx) {
        screen::live_design(cx);
    }
}

/// Register all Podcast Generator widgets with Makepad
pub fn live_design(cx: &mut Cx) {
    PodcastGeneratorApp::live_design(cx);
}
