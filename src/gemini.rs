//! Minimal Gemini `generateContent` client.
//!
//! The backend is consumed through its documented REST interface only. One
//! request per call, no retries; callers decide whether a failure is
//! recoverable.

use crate::config::TextSettings;
use crate::error::{RasiError, Result};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default timeout for Gemini API requests (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable carrying the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Client for the Gemini text-generation backend.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    settings: TextSettings,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    /// Create a client using the key from the environment.
    pub fn new(settings: &TextSettings) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            RasiError::Config(format!(
                "{} not set. Set it with: export {}='...'",
                API_KEY_ENV, API_KEY_ENV
            ))
        })?;
        if api_key.is_empty() {
            return Err(RasiError::Config(format!("{} is empty", API_KEY_ENV)));
        }
        Ok(Self::with_key(settings, api_key))
    }

    /// Create a client with an explicit key.
    pub fn with_key(settings: &TextSettings, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            settings: settings.clone(),
        }
    }

    /// Send a single prompt and return the generated text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        info!("Sending request to Gemini ({})", self.settings.model);
        debug!("Prompt length: {} characters", prompt.len());

        let url = format!(
            "{}/{}:generateContent?key={}",
            API_BASE, self.settings.model, self.api_key
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.settings.temperature,
                "topP": self.settings.top_p,
                "topK": self.settings.top_k,
                "maxOutputTokens": self.settings.max_output_tokens,
            },
            "safetySettings": [
                { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
            ],
        });

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(RasiError::TextGeneration(format!(
                "backend returned {}: {}",
                status, detail
            )));
        }

        let parsed: GenerateResponse = response.json().await?;

        let text = parsed
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|parts| {
                let joined: String = parts.into_iter().filter_map(|p| p.text).collect();
                if joined.is_empty() {
                    None
                } else {
                    Some(joined)
                }
            })
            .ok_or_else(|| {
                RasiError::TextGeneration("backend returned no candidates".to_string())
            })?;

        debug!("Raw response length: {} characters", text.len());
        Ok(text)
    }
}

/// Check if the Gemini API key is configured.
pub fn is_api_key_configured() -> bool {
    std::env::var(API_KEY_ENV).map(|k| !k.is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "Today's horoscope results:" } ] } }
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text = parsed.candidates.unwrap()[0]
            .content
            .as_ref()
            .unwrap()
            .parts
            .as_ref()
            .unwrap()[0]
            .text
            .clone()
            .unwrap();
        assert_eq!(text, "Today's horoscope results:");
    }

    #[test]
    fn test_empty_response_parses() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_none());
    }
}
