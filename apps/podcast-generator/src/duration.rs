//! Duration suggestion - estimate how many spoken minutes a source text needs
//!
//! Two strategies are provided and selected through the active profile:
//! - [`StructureAwareEstimator`] weighs sentence density and paragraph breaks
//! - [`WordCountEstimator`] divides words by 100, optionally after reducing
//!   JSON input to its essential text

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Suggested podcast length in whole minutes, always within [1, 60]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationSuggestion {
    pub minutes: u32,
}

impl DurationSuggestion {
    fn clamped(minutes: i64, min: i64) -> Self {
        Self {
            minutes: minutes.clamp(min, 60) as u32,
        }
    }
}

/// Strategy interface for duration suggestions
pub trait DurationEstimator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns `None` for empty input; the caller keeps its previous suggestion.
    fn estimate(&self, text: &str) -> Option<DurationSuggestion>;
}

/// Which estimator a profile uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    StructureAware,
    WordCount,
}

impl EstimatorKind {
    pub fn build(self) -> Box<dyn DurationEstimator> {
        match self {
            EstimatorKind::StructureAware => Box::new(StructureAwareEstimator),
            EstimatorKind::WordCount => Box::new(WordCountEstimator::with_json_reduction()),
        }
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn non_blank_segments(text: &str, separator: &str) -> usize {
    text.split(separator).filter(|s| !s.trim().is_empty()).count()
}

/// `numerator / denominator` clamped to `[low, high]`; a zero denominator yields `low`
fn bounded_ratio(numerator: f64, denominator: f64, low: f64, high: f64) -> f64 {
    if denominator == 0.0 {
        return low;
    }
    (numerator / denominator).clamp(low, high)
}

// ============================================================================
// STRUCTURE-AWARE ESTIMATOR
// ============================================================================

/// Conversational base rate of 100 words per minute, slowed down for dense
/// sentences and for text with many paragraph breaks.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureAwareEstimator;

impl DurationEstimator for StructureAwareEstimator {
    fn name(&self) -> &'static str {
        "structure_aware"
    }

    fn estimate(&self, text: &str) -> Option<DurationSuggestion> {
        let content = text.trim();
        if content.is_empty() {
            return None;
        }

        let words = word_count(content) as f64;
        let sentences = non_blank_segments(content, ".") as f64;
        let paragraphs = non_blank_segments(content, "\n\n") as f64;

        // Sentences per 15 words, paragraphs per 3 sentences
        let complexity = bounded_ratio(sentences, words / 15.0, 0.8, 2.0);
        let paragraph = bounded_ratio(paragraphs, sentences / 3.0, 1.0, 1.5);

        let base_minutes = words / 100.0;
        let suggested = (base_minutes * complexity * paragraph).round_ties_even() as i64;

        Some(DurationSuggestion::clamped(suggested, 1))
    }
}

// ============================================================================
// WORD-COUNT ESTIMATOR
// ============================================================================

/// 100 words per minute, floored, with a five minute minimum
#[derive(Debug, Clone, Default)]
pub struct WordCountEstimator {
    reducer: Option<JsonContentReducer>,
}

impl WordCountEstimator {
    pub fn new() -> Self {
        Self { reducer: None }
    }

    pub fn with_json_reduction() -> Self {
        Self {
            reducer: Some(JsonContentReducer::default()),
        }
    }
}

impl DurationEstimator for WordCountEstimator {
    fn name(&self) -> &'static str {
        "word_count"
    }

    fn estimate(&self, text: &str) -> Option<DurationSuggestion> {
        let content = text.trim();
        if content.is_empty() {
            return None;
        }

        let reduced = self.reducer.as_ref().and_then(|r| r.reduce(content));
        let words = match &reduced {
            Some(essential) => word_count(essential),
            None => word_count(content),
        };

        Some(DurationSuggestion::clamped((words / 100) as i64, 5))
    }
}

// ============================================================================
// JSON CONTENT REDUCER
// ============================================================================

const NON_ESSENTIAL_KEYS: &[&str] = &[
    "id", "uuid", "timestamp", "created_at", "updated_at", "date", "url", "urls", "link",
    "links", "href", "image", "images", "thumbnail", "metadata", "meta", "tags", "source",
    "author_id", "version",
];

/// Strips bookkeeping fields from JSON input so only spoken content is counted
#[derive(Debug, Clone)]
pub struct JsonContentReducer {
    non_essential: Vec<String>,
}

impl Default for JsonContentReducer {
    fn default() -> Self {
        Self {
            non_essential: NON_ESSENTIAL_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl JsonContentReducer {
    /// Returns the essential text, or `None` when the input is not a JSON object or array
    pub fn reduce(&self, text: &str) -> Option<String> {
        let value: Value = serde_json::from_str(text.trim()).ok()?;
        if !value.is_object() && !value.is_array() {
            return None;
        }

        let mut parts = Vec::new();
        self.collect(&value, &mut parts);
        Some(parts.join(" "))
    }

    fn is_non_essential(&self, key: &str) -> bool {
        self.non_essential.iter().any(|k| k.eq_ignore_ascii_case(key))
    }

    fn collect<'a>(&self, value: &'a Value, parts: &mut Vec<&'a str>) {
        match value {
            Value::String(s) => {
                let s = s.trim();
                if !s.is_empty() {
                    parts.push(s);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.collect(item, parts);
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    if !self.is_non_essential(key) {
                        self.collect(item, parts);
                    }
                }
            }
            Value::Number(_) | Value::Bool(_) | Value::Null => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(words: usize) -> String {
        let mut s = vec!["word"; words].join(" ");
        s.push('.');
        s
    }

    #[test]
    fn test_empty_input_is_no_update() {
        assert_eq!(StructureAwareEstimator.estimate(""), None);
        assert_eq!(StructureAwareEstimator.estimate("   \n\n  "), None);
        assert_eq!(WordCountEstimator::new().estimate(""), None);
    }

    #[test]
    fn test_structure_aware_neutral_factors() {
        // 300 words in 20 sentences of 15 words, one paragraph:
        // complexity 1.0, paragraph factor clamps up to 1.0, base 3 minutes
        let text = (0..20).map(|_| sentence(15)).collect::<Vec<_>>().join(" ");
        assert_eq!(StructureAwareEstimator.estimate(&text).unwrap().minutes, 3);
    }

    #[test]
    fn test_structure_aware_long_sentences_clamp_complexity() {
        // 300 words, 6 sentences, 2 paragraphs: complexity 0.3 -> 0.8, paragraph 1.0
        let para = (0..3).map(|_| sentence(50)).collect::<Vec<_>>().join(" ");
        let text = format!("{}\n\n{}", para, para);
        assert_eq!(StructureAwareEstimator.estimate(&text).unwrap().minutes, 2);
    }

    #[test]
    fn test_structure_aware_paragraph_factor() {
        // 300 words, 3 sentences, 3 paragraphs: 3.0 * 0.8 * 1.5 = 3.6 -> 4
        let text = (0..3).map(|_| sentence(100)).collect::<Vec<_>>().join("\n\n");
        assert_eq!(StructureAwareEstimator.estimate(&text).unwrap().minutes, 4);
    }

    #[test]
    fn test_structure_aware_bounds() {
        assert_eq!(StructureAwareEstimator.estimate("Hello world.").unwrap().minutes, 1);

        let huge = (0..1000).map(|_| sentence(15)).collect::<Vec<_>>().join(" ");
        assert_eq!(StructureAwareEstimator.estimate(&huge).unwrap().minutes, 60);
    }

    #[test]
    fn test_structure_aware_without_sentences() {
        // Only dots: no sentence segments, paragraph ratio guards the zero divisor
        let suggestion = StructureAwareEstimator.estimate("... ...").unwrap();
        assert_eq!(suggestion.minutes, 1);
    }

    #[test]
    fn test_word_count_minimum_and_maximum() {
        let estimator = WordCountEstimator::new();
        assert_eq!(estimator.estimate("just a few words").unwrap().minutes, 5);
        assert_eq!(estimator.estimate(&vec!["w"; 1250].join(" ")).unwrap().minutes, 12);
        assert_eq!(estimator.estimate(&vec!["w"; 9000].join(" ")).unwrap().minutes, 60);
    }

    #[test]
    fn test_word_count_reduces_json() {
        let body = vec!["talk"; 700].join(" ");
        let noise = vec!["https://example.com/x"; 900].join(" ");
        let json = format!(
            r#"{{"id": 7, "title": "Episode", "body": "{}", "url": "{}", "metadata": {{"note": "{}"}}}}"#,
            body, noise, noise
        );

        let plain = WordCountEstimator::new().estimate(&json).unwrap();
        let reduced = WordCountEstimator::with_json_reduction().estimate(&json).unwrap();

        assert_eq!(plain.minutes, 25);
        assert_eq!(reduced.minutes, 7);
    }

    #[test]
    fn test_reducer_ignores_plain_text() {
        let reducer = JsonContentReducer::default();
        assert_eq!(reducer.reduce("not json at all"), None);
        assert_eq!(reducer.reduce("42"), None);
    }

    #[test]
    fn test_reducer_collects_string_leaves() {
        let reducer = JsonContentReducer::default();
        let reduced = reducer
            .reduce(r#"[{"speaker": "Ana", "ID": "x1", "text": "hi there"}, {"text": "bye", "done": true}]"#)
            .unwrap();
        assert_eq!(reduced, "Ana hi there bye");
    }

    #[test]
    fn test_estimator_kind_builds_named_strategy() {
        assert_eq!(EstimatorKind::StructureAware.build().name(), "structure_aware");
        assert_eq!(EstimatorKind::WordCount.build().name(), "word_count");
    }
}
