//! Microsoft Edge voices through the `edge-tts` command-line helper

use std::ffi::OsString;
use std::path::Path;

use tokio::process::Command;

use super::{SpeechSynthesizer, TtsProvider};
use crate::error::{GeneratorError, Result};

pub struct EdgeSpeech {
    command: String,
}

impl EdgeSpeech {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }

    /// The text is glued to its flag so a turn starting with `-` is not
    /// mistaken for an option
    fn args(text: &str, voice: &str, media: &Path) -> Vec<OsString> {
        let mut text_arg = OsString::from("--text=");
        text_arg.push(text);
        vec![
            "--voice".into(),
            voice.into(),
            text_arg,
            "--write-media".into(),
            media.as_os_str().to_os_string(),
        ]
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for EdgeSpeech {
    fn provider(&self) -> TtsProvider {
        TtsProvider::Edge
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        let media = tempfile::Builder::new()
            .prefix("podcast-edge-")
            .suffix(".mp3")
            .tempfile()?;

        let output = Command::new(&self.command)
            .args(Self::args(text, voice, media.path()))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| GeneratorError::speech(format!("Failed to run {}: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            ::log::error!("{} failed ({}): {}", self.command, output.status, stderr.trim());
            return Err(GeneratorError::speech(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let audio = tokio::fs::read(media.path()).await?;
        Ok(audio)
    }
}
