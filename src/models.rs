// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Handle to an image persisted in the uploads directory.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub name: String,
    pub path: PathBuf,
    pub size: usize,
}

/// Text recognized by the OCR engine plus metrics derived from it.
///
/// Word and character counts are always recomputed from `raw`; there is no
/// way to construct this type with counts supplied independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedText {
    pub raw: String,
    pub word_count: usize,
    pub character_count: usize,
}

impl ExtractedText {
    pub fn from_raw(raw: String) -> Self {
        let word_count = raw.split_whitespace().count();
        let character_count = raw.chars().count();
        Self {
            raw,
            word_count,
            character_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

/// Structured analysis of extracted text, as declared to the model.
///
/// Sentiment and confidence are model-declared free text; the server does
/// not enforce an enum. The timestamp is stamped by the service after
/// parsing, never trusted from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub sentiment: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub confidence: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

/// Structured answer returned by the detailed /ask endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnswer {
    pub answer: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub confidence: String,
    #[serde(default)]
    pub related_topics: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

const DEGRADED_ANSWER_PREFIX: &str =
    "The model did not return structured data. Raw reply (truncated): ";
const DEGRADED_ANSWER_LIMIT: usize = 500;

impl DetailedAnswer {
    /// Fallback answer used when the model's reply is not parseable as
    /// structured data. The request still succeeds; the caller gets the raw
    /// reply truncated to 500 characters and a hint to rephrase.
    pub fn degraded(raw_reply: &str) -> Self {
        let prefix: String = raw_reply.chars().take(DEGRADED_ANSWER_LIMIT).collect();
        Self {
            answer: format!("{}{}", DEGRADED_ANSWER_PREFIX, prefix),
            evidence: Vec::new(),
            confidence: "Low".to_string(),
            related_topics: Vec::new(),
            suggestions: vec![
                "Try rephrasing the question to be more specific about the analyzed text."
                    .to_string(),
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub question: Option<String>,
    pub analysis_context: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub question: Option<String>,
    pub analysis_context: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_derived_from_raw() {
        let text = ExtractedText::from_raw("hello   world\nfoo\tbar".to_string());
        assert_eq!(text.word_count, 4);
        assert_eq!(text.character_count, 21);
    }

    #[test]
    fn counts_handle_unicode() {
        let text = ExtractedText::from_raw("héllo wörld 你好".to_string());
        assert_eq!(text.word_count, 3);
        // chars(), not bytes
        assert_eq!(text.character_count, 14);
    }

    #[test]
    fn whitespace_only_text_is_empty() {
        assert!(ExtractedText::from_raw("  \n\t ".to_string()).is_empty());
        assert!(ExtractedText::from_raw(String::new()).is_empty());
        assert!(!ExtractedText::from_raw(" x ".to_string()).is_empty());
    }

    #[test]
    fn extracted_text_serializes_camel_case() {
        let value = serde_json::to_value(ExtractedText::from_raw("one two".to_string())).unwrap();
        assert_eq!(value["wordCount"], 2);
        assert_eq!(value["characterCount"], 7);
        assert_eq!(value["raw"], "one two");
    }

    #[test]
    fn analysis_result_parses_model_shape() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{
                "summary": "An invoice for office supplies.",
                "keyPoints": ["total due is $120", "net 30 terms"],
                "sentiment": "neutral",
                "topics": ["invoice", "office supplies"],
                "language": "English",
                "confidence": "High"
            }"#,
        )
        .unwrap();
        assert_eq!(result.key_points.len(), 2);
        assert_eq!(result.confidence, "High");
    }

    #[test]
    fn degraded_answer_truncates_and_hints() {
        let long_reply = "x".repeat(2000);
        let answer = DetailedAnswer::degraded(&long_reply);
        assert!(answer.answer.len() < 600);
        assert!(answer.answer.contains(&"x".repeat(500)));
        assert!(answer.evidence.is_empty());
        assert!(answer.related_topics.is_empty());
        assert_eq!(answer.confidence, "Low");
        assert_eq!(answer.suggestions.len(), 1);
    }

    #[test]
    fn degraded_answer_is_char_boundary_safe() {
        let reply = "é".repeat(1000);
        let answer = DetailedAnswer::degraded(&reply);
        assert!(answer.answer.ends_with(&"é".repeat(500)));
    }

    #[test]
    fn detailed_answer_round_trips_camel_case() {
        let value = serde_json::to_value(DetailedAnswer::degraded("prose")).unwrap();
        assert!(value.get("relatedTopics").is_some());
        assert!(value.get("related_topics").is_none());
    }
}
