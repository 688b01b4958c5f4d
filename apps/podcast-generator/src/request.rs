//! Podcast request - form values, duration entry parsing and prompt building

use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, Result};
use crate::token_budget::{clamp_duration, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};

/// Duration the form starts with and falls back to on unparseable input
pub const DEFAULT_DURATION_MINUTES: f64 = 5.0;

/// Prompt used when the system prompt editor is left blank
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a podcast host creating an engaging conversation about the given topic. Create a dialogue between speakers discussing the topic in an interesting and informative way.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PodcastStyle {
    #[default]
    Conversational,
    Professional,
    Casual,
    Academic,
    Humorous,
    Serious,
}

impl PodcastStyle {
    pub const ALL: [PodcastStyle; 6] = [
        PodcastStyle::Conversational,
        PodcastStyle::Professional,
        PodcastStyle::Casual,
        PodcastStyle::Academic,
        PodcastStyle::Humorous,
        PodcastStyle::Serious,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PodcastStyle::Conversational => "Conversational",
            PodcastStyle::Professional => "Professional",
            PodcastStyle::Casual => "Casual",
            PodcastStyle::Academic => "Academic",
            PodcastStyle::Humorous => "Humorous",
            PodcastStyle::Serious => "Serious",
        }
    }

    /// Dropdown index, matching `ALL`
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }
}

/// Number of speakers the model is asked to write for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SpeakerCount {
    #[default]
    Two,
    Three,
    Four,
}

impl SpeakerCount {
    pub const ALL: [SpeakerCount; 3] = [SpeakerCount::Two, SpeakerCount::Three, SpeakerCount::Four];

    pub fn count(&self) -> u8 {
        match self {
            SpeakerCount::Two => 2,
            SpeakerCount::Three => 3,
            SpeakerCount::Four => 4,
        }
    }

    pub fn index(&self) -> usize {
        self.count() as usize - 2
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }
}

impl TryFrom<u8> for SpeakerCount {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            2 => Ok(SpeakerCount::Two),
            3 => Ok(SpeakerCount::Three),
            4 => Ok(SpeakerCount::Four),
            other => Err(format!("speaker count must be 2, 3 or 4, got {}", other)),
        }
    }
}

impl From<SpeakerCount> for u8 {
    fn from(value: SpeakerCount) -> Self {
        value.count()
    }
}

// ============================================================================
// DURATION ENTRY
// ============================================================================

/// Outcome of validating the free-text duration field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationEntry {
    /// Field is empty; leave it and the slider alone
    Unchanged,
    /// Accepted as typed
    Value(f64),
    /// Out of range; field and slider are rewritten to this bound
    ClampedTo(f64),
    /// Not a number; field and slider reset to the default
    ResetToDefault,
}

impl DurationEntry {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return DurationEntry::Unchanged;
        }

        match input.parse::<f64>() {
            Ok(minutes) if !minutes.is_finite() => DurationEntry::ResetToDefault,
            Ok(minutes) if minutes < MIN_DURATION_MINUTES => {
                DurationEntry::ClampedTo(MIN_DURATION_MINUTES)
            }
            Ok(minutes) if minutes > MAX_DURATION_MINUTES => {
                DurationEntry::ClampedTo(MAX_DURATION_MINUTES)
            }
            Ok(minutes) => DurationEntry::Value(minutes),
            Err(_) => DurationEntry::ResetToDefault,
        }
    }

    /// Minutes the form should hold after this entry, if it changes anything
    pub fn minutes(&self) -> Option<f64> {
        match self {
            DurationEntry::Unchanged => None,
            DurationEntry::Value(m) | DurationEntry::ClampedTo(m) => Some(*m),
            DurationEntry::ResetToDefault => Some(DEFAULT_DURATION_MINUTES),
        }
    }

    /// Whether the text field must be rewritten
    pub fn rewrites_field(&self) -> bool {
        matches!(self, DurationEntry::ClampedTo(_) | DurationEntry::ResetToDefault)
    }
}

/// `5.0` renders as `5`, `2.5` stays `2.5`
pub fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{}", minutes as i64)
    } else {
        format!("{}", minutes)
    }
}

// ============================================================================
// REQUEST
// ============================================================================

/// Everything the chat call needs; cloned into the worker on submit
#[derive(Debug, Clone, PartialEq)]
pub struct PodcastRequest {
    pub source_text: String,
    pub style: PodcastStyle,
    pub speakers: SpeakerCount,
    pub duration_minutes: f64,
    pub system_prompt: String,
}

impl PodcastRequest {
    pub fn new(
        source_text: impl Into<String>,
        style: PodcastStyle,
        speakers: SpeakerCount,
        duration_minutes: f64,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            style,
            speakers,
            duration_minutes: clamp_duration(duration_minutes),
            system_prompt: system_prompt.into(),
        }
    }

    /// Reject a request with no source text
    pub fn validate(&self) -> Result<()> {
        if self.source_text.trim().is_empty() {
            return Err(GeneratorError::validation("Please enter some text first!"));
        }
        Ok(())
    }

    /// System message: the editor content, or `fallback` with placeholders filled in
    pub fn system_message(&self, fallback: &str) -> String {
        let prompt = self.system_prompt.trim();
        if !prompt.is_empty() {
            return prompt.to_string();
        }

        let template = if fallback.trim().is_empty() {
            DEFAULT_SYSTEM_PROMPT
        } else {
            fallback
        };
        template
            .replace("{style}", &self.style.label().to_lowercase())
            .replace("{speakers}", &self.speakers.count().to_string())
            .replace("{minutes}", &format_minutes(self.duration_minutes))
    }

    pub fn user_message(&self) -> String {
        format!(
            "Create a {} podcast transcript with {} speakers about: {}. The transcript should be approximately {} minutes long when spoken at a natural pace.",
            self.style.label().to_lowercase(),
            self.speakers.count(),
            self.source_text.trim(),
            format_minutes(self.duration_minutes),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_entry_examples() {
        assert_eq!(DurationEntry::parse("0"), DurationEntry::ClampedTo(1.0));
        assert_eq!(DurationEntry::parse("-4"), DurationEntry::ClampedTo(1.0));
        assert_eq!(DurationEntry::parse("120"), DurationEntry::ClampedTo(60.0));
        assert_eq!(DurationEntry::parse("abc"), DurationEntry::ResetToDefault);
        assert_eq!(DurationEntry::parse("NaN"), DurationEntry::ResetToDefault);
        assert_eq!(DurationEntry::parse(""), DurationEntry::Unchanged);
        assert_eq!(DurationEntry::parse("   "), DurationEntry::Unchanged);
        assert_eq!(DurationEntry::parse(" 12 "), DurationEntry::Value(12.0));
        assert_eq!(DurationEntry::parse("2.5"), DurationEntry::Value(2.5));
    }

    #[test]
    fn test_duration_entry_minutes() {
        assert_eq!(DurationEntry::parse("abc").minutes(), Some(5.0));
        assert_eq!(DurationEntry::parse("").minutes(), None);
        assert!(DurationEntry::parse("0").rewrites_field());
        assert!(!DurationEntry::parse("7").rewrites_field());
    }

    #[test]
    fn test_user_message() {
        let request = PodcastRequest::new(
            "  Rust ownership  ",
            PodcastStyle::Humorous,
            SpeakerCount::Three,
            5.0,
            "",
        );
        assert_eq!(
            request.user_message(),
            "Create a humorous podcast transcript with 3 speakers about: Rust ownership. The transcript should be approximately 5 minutes long when spoken at a natural pace."
        );
    }

    #[test]
    fn test_request_clamps_duration() {
        let request = PodcastRequest::new("x", PodcastStyle::default(), SpeakerCount::Two, 90.0, "");
        assert_eq!(request.duration_minutes, 60.0);
    }

    #[test]
    fn test_system_message_fallbacks() {
        let mut request =
            PodcastRequest::new("x", PodcastStyle::Academic, SpeakerCount::Four, 12.0, "   ");
        assert_eq!(request.system_message(""), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(
            request.system_message("A {style} show for {speakers} voices, {minutes} min"),
            "A academic show for 4 voices, 12 min"
        );

        request.system_prompt = "Custom".to_string();
        assert_eq!(request.system_message("ignored"), "Custom");
    }

    #[test]
    fn test_validate_rejects_blank_source() {
        let request = PodcastRequest::new(" \n", PodcastStyle::Casual, SpeakerCount::Two, 5.0, "");
        let err = request.validate().unwrap_err();
        assert_eq!(err.to_string(), "Please enter some text first!");
    }

    #[test]
    fn test_dropdown_indices() {
        assert_eq!(PodcastStyle::from_index(3), PodcastStyle::Academic);
        assert_eq!(PodcastStyle::Serious.index(), 5);
        assert_eq!(PodcastStyle::from_index(99), PodcastStyle::Conversational);
        assert_eq!(SpeakerCount::from_index(1).count(), 3);
        assert_eq!(SpeakerCount::Four.index(), 2);
        assert!(SpeakerCount::try_from(5).is_err());
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(5.0), "5");
        assert_eq!(format_minutes(2.5), "2.5");
    }
}
