//! Persisted user preferences
//!
//! Stored as JSON at `<config_dir>/podcast-studio/preferences.json`. Loading
//! never fails: a missing or unreadable file yields the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Profile;
use crate::request::{PodcastStyle, SpeakerCount};
use crate::tts::{TtsProvider, VoiceSelection};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub dark_mode: bool,
    pub profile: Option<Profile>,
    pub style: PodcastStyle,
    pub speakers: SpeakerCount,
    pub provider: TtsProvider,
    pub voices: VoiceSelection,
    pub output_dir: Option<PathBuf>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            profile: None,
            style: PodcastStyle::default(),
            speakers: SpeakerCount::default(),
            provider: TtsProvider::default(),
            voices: VoiceSelection::default(),
            output_dir: None,
        }
    }
}

impl Preferences {
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("podcast-studio");
        path.push("preferences.json");
        Some(path)
    }

    /// Load from the default location
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                ::log::warn!("Cannot determine config directory, using default preferences");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let mut prefs = match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Preferences>(&content) {
                Ok(prefs) => {
                    ::log::info!("Loaded preferences from {}", path.display());
                    prefs
                }
                Err(e) => {
                    ::log::warn!("Failed to parse preferences: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ::log::info!("No saved preferences, using defaults");
                Self::default()
            }
            Err(e) => {
                ::log::warn!("Failed to read preferences: {}, using defaults", e);
                Self::default()
            }
        };

        // Voices saved for another provider are repaired on load
        prefs.voices = VoiceSelection::for_provider(prefs.provider, &prefs.voices.host, &prefs.voices.guest);
        prefs
    }

    pub fn save(&self) {
        match Self::default_path() {
            Some(path) => self.save_to(&path),
            None => ::log::warn!("Cannot determine config directory, skipping save"),
        }
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                ::log::warn!("Failed to create config directory: {}", e);
                return;
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => match fs::write(path, json) {
                Ok(()) => ::log::debug!("Saved preferences to {}", path.display()),
                Err(e) => ::log::warn!("Failed to save preferences: {}", e),
            },
            Err(e) => ::log::warn!("Failed to serialize preferences: {}", e),
        }
    }
}
