//! Speaker turns - wrap plain dialogue lines into tagged Person1/Person2 segments
//!
//! A transcript coming back from the chat model is one utterance per line.
//! Lines alternate between the host (`Person1`) and the guest (`Person2`);
//! the tagged text is then cleaned and split into question/answer pairs that
//! the speech synthesizers consume.

use regex::{Captures, Regex};

use crate::error::{GeneratorError, Result};

/// Speaker slot in a tagged transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeakerTag {
    Person1,
    Person2,
}

impl SpeakerTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeakerTag::Person1 => "Person1",
            SpeakerTag::Person2 => "Person2",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            SpeakerTag::Person1 => SpeakerTag::Person2,
            SpeakerTag::Person2 => SpeakerTag::Person1,
        }
    }

    /// Wrap `text` as `<PersonN>text</PersonN>`
    pub fn wrap(&self, text: &str) -> String {
        format!("<{0}>{1}</{0}>", self.as_str(), text)
    }
}

/// One spoken turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSegment {
    pub speaker: SpeakerTag,
    pub text: String,
}

/// Tags that are always kept by the cleaner
const SPEAKER_TAGS: [&str; 2] = ["Person1", "Person2"];

/// Filler line spoken by the host when a transcript opens with the guest
const HOST_OPENER: &str = "<Person1> Humm... </Person1>";

// ============================================================================
// TAG CLEANER
// ============================================================================

/// Removes markup a synthesizer cannot speak
pub struct TagCleaner {
    any_tag: Regex,
    blank_lines: Regex,
    empty_element: Regex,
    qa_pair: Regex,
}

impl TagCleaner {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| GeneratorError::validation(format!("Failed to create regex: {}", e)))
        };

        Ok(Self {
            any_tag: compile(r"</?([A-Za-z][\w-]*)(?:\s[^>]*)?/?>")?,
            blank_lines: compile(r"\n\s*\n")?,
            empty_element: compile(r"<(\w+)(?:\s+[^>]*)?>\s*</(\w+)>")?,
            qa_pair: compile(r"(?s)<Person1>(.*?)</Person1>\s*<Person2>(.*?)</Person2>")?,
        })
    }

    /// Strip unsupported tags, collapse blank lines, drop empty elements, trim
    pub fn clean(&self, text: &str, supported_tags: &[&str]) -> String {
        let keep = |name: &str| {
            SPEAKER_TAGS.contains(&name) || supported_tags.iter().any(|t| *t == name)
        };

        let stripped = self.any_tag.replace_all(text, |caps: &Captures| {
            if keep(&caps[1]) {
                caps[0].to_string()
            } else {
                String::new()
            }
        });

        let collapsed = self.blank_lines.replace_all(&stripped, "\n");

        let without_empty = self.empty_element.replace_all(&collapsed, |caps: &Captures| {
            if caps[1] == caps[2] {
                String::new()
            } else {
                caps[0].to_string()
            }
        });

        without_empty.trim().to_string()
    }

    /// Clean `text`, repair a missing opener or closer, and extract
    /// `(Person1, Person2)` pairs with whitespace normalised.
    pub fn split_qa(&self, text: &str, ending: &str, supported_tags: &[&str]) -> Vec<(String, String)> {
        let mut cleaned = self.clean(text, supported_tags);

        if cleaned.starts_with("<Person2>") {
            cleaned = format!("{}{}", HOST_OPENER, cleaned);
        }
        if cleaned.ends_with("</Person1>") {
            cleaned.push_str(&SpeakerTag::Person2.wrap(ending));
        }

        self.qa_pair
            .captures_iter(&cleaned)
            .map(|caps| (normalize_whitespace(&caps[1]), normalize_whitespace(&caps[2])))
            .collect()
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// TURN FORMATTER
// ============================================================================

/// Alternates plain lines between host and guest
pub struct TurnFormatter {
    cleaner: TagCleaner,
    supported_tags: Vec<String>,
}

impl TurnFormatter {
    pub fn new(supported_tags: &[&str]) -> Result<Self> {
        Ok(Self {
            cleaner: TagCleaner::new()?,
            supported_tags: supported_tags.iter().map(|t| t.to_string()).collect(),
        })
    }

    /// Wrap each non-blank line as an alternating speaker turn.
    ///
    /// Blank lines do not consume a slot. A non-empty `ending` is appended
    /// as a final `Person2` turn.
    pub fn format_turns(raw: &str, ending: &str) -> String {
        let mut speaker = SpeakerTag::Person1;
        let mut turns = Vec::new();

        for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
            turns.push(speaker.wrap(line));
            speaker = speaker.other();
        }

        if !ending.is_empty() {
            turns.push(SpeakerTag::Person2.wrap(ending));
        }

        turns.join("\n")
    }

    /// Format and split into `(question, answer)` pairs
    pub fn split_turns(&self, raw: &str, ending: &str) -> Vec<(String, String)> {
        let formatted = Self::format_turns(raw, ending);
        let tags: Vec<&str> = self.supported_tags.iter().map(String::as_str).collect();
        self.cleaner.split_qa(&formatted, "", &tags)
    }

    /// Flatten pairs into alternating segments, skipping empty answers
    pub fn segments(&self, raw: &str, ending: &str) -> Vec<TranscriptSegment> {
        let mut segments = Vec::new();
        for (question, answer) in self.split_turns(raw, ending) {
            segments.push(TranscriptSegment {
                speaker: SpeakerTag::Person1,
                text: question,
            });
            if !answer.is_empty() {
                segments.push(TranscriptSegment {
                    speaker: SpeakerTag::Person2,
                    text: answer,
                });
            }
        }
        segments
    }
}
