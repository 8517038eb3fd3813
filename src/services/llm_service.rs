// src/services/llm_service.rs
use crate::errors::TextLensError;
use crate::models::{AnalysisResult, DetailedAnswer};
use log::warn;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT_SECS: u64 = 120;

const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a text analysis assistant. Analyze the text supplied in the user message and respond with a single JSON object of exactly this shape:
{
    "summary": "one or two sentence summary",
    "keyPoints": ["the most important points, in order"],
    "sentiment": "positive, negative or neutral",
    "topics": ["main topics covered"],
    "language": "the language the text is written in",
    "confidence": "High, Medium or Low"
}
Respond with JSON only, no surrounding prose."#;

pub struct LLMService {
    api_key: String,
    base_url: String,
    model: String,
    client: Client,
}

impl LLMService {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            api_key,
            base_url,
            model,
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Analyze extracted text into a structured [`AnalysisResult`].
    ///
    /// A reply that is not valid JSON of the declared shape is a hard
    /// failure here, unlike the /ask path. The generation timestamp is
    /// stamped locally, never taken from the model.
    pub async fn analyze_text(&self, raw_text: &str) -> Result<AnalysisResult, TextLensError> {
        let content = self
            .chat_completion(ANALYSIS_SYSTEM_PROMPT, raw_text, true)
            .await?;

        let mut analysis: AnalysisResult = serde_json::from_str(&content).map_err(|e| {
            TextLensError::ModelResponseParse(format!("Analysis was not valid JSON: {}", e))
        })?;
        analysis.timestamp = chrono::Utc::now();

        Ok(analysis)
    }

    /// Answer a follow-up question against a previously produced analysis
    /// context, returning the model's reply verbatim.
    pub async fn chat(
        &self,
        question: &str,
        context: &serde_json::Value,
    ) -> Result<String, TextLensError> {
        let system_prompt = format!(
            "You are answering questions about a document that was previously analyzed.\n\n\
             Document text:\n{raw}\n\n\
             Summary: {summary}\n\
             Sentiment: {sentiment}\n\
             Topics: {topics}\n\
             Language: {language}\n\n\
             Answer the user's question concisely, using only this context.",
            raw = context["textExtraction"]["raw"].as_str().unwrap_or(""),
            summary = context["analysis"]["summary"].as_str().unwrap_or(""),
            sentiment = context["analysis"]["sentiment"].as_str().unwrap_or(""),
            topics = joined_strings(&context["analysis"]["topics"]),
            language = context["analysis"]["language"].as_str().unwrap_or(""),
        );

        self.chat_completion(&system_prompt, question, false).await
    }

    /// Answer a follow-up question with a structured [`DetailedAnswer`].
    ///
    /// Parse failure is swallowed into a degraded-but-successful answer;
    /// only transport and API failures surface as errors.
    pub async fn ask(
        &self,
        question: &str,
        context: &serde_json::Value,
    ) -> Result<DetailedAnswer, TextLensError> {
        let extraction = &context["textExtraction"];
        let analysis = &context["analysis"];

        let system_prompt = format!(
            "You are answering questions about a document that was previously analyzed.\n\n\
             Document text:\n{raw}\n\n\
             Word count: {words}\n\
             Character count: {chars}\n\
             Summary: {summary}\n\
             Sentiment: {sentiment}\n\
             Topics: {topics}\n\
             Language: {language}\n\n\
             Answer the user's question using only this context. Respond with a single JSON \
             object of exactly this shape:\n\
             {{\n\
                 \"answer\": \"direct answer to the question\",\n\
                 \"evidence\": [\"quotes from the document supporting the answer\"],\n\
                 \"confidence\": \"High, Medium or Low\",\n\
                 \"relatedTopics\": [\"topics related to the question\"],\n\
                 \"suggestions\": [\"follow-up questions worth asking\"]\n\
             }}\n\
             Respond with JSON only, no surrounding prose.",
            raw = extraction["raw"].as_str().unwrap_or(""),
            words = extraction["wordCount"].as_u64().unwrap_or(0),
            chars = extraction["characterCount"].as_u64().unwrap_or(0),
            summary = analysis["summary"].as_str().unwrap_or(""),
            sentiment = analysis["sentiment"].as_str().unwrap_or(""),
            topics = joined_strings(&analysis["topics"]),
            language = analysis["language"].as_str().unwrap_or(""),
        );

        let content = self.chat_completion(&system_prompt, question, true).await?;

        match serde_json::from_str::<DetailedAnswer>(&content) {
            Ok(answer) => Ok(answer),
            Err(e) => {
                warn!("Model reply was not parseable as a structured answer: {}", e);
                Ok(DetailedAnswer::degraded(&content))
            }
        }
    }

    async fn chat_completion(
        &self,
        system_prompt: &str,
        user_message: &str,
        json_output: bool,
    ) -> Result<String, TextLensError> {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message }
            ],
            "max_tokens": 2048,
        });
        if json_output {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| TextLensError::Processing(format!("LLM request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TextLensError::Processing(format!(
                "LLM API error ({}): {}",
                status, error_text
            )));
        }

        let result: serde_json::Value = response.json().await.map_err(|e| {
            TextLensError::Processing(format!("Failed to read LLM response: {}", e))
        })?;

        result["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| TextLensError::Processing("No content in LLM response".to_string()))
    }
}

fn joined_strings(value: &serde_json::Value) -> String {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}
