//! Minimal reqwest client for the Mistral chat completions API.
//!
//! One user message in, the first choice's text out. No streaming.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ReportConfig;

/// Errors from report generation.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("no API key configured, set MISTRAL_API_KEY or report.api_key")]
    MissingApiKey,

    #[error("API returned no choices")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug)]
pub struct MistralClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl MistralClient {
    pub fn new(config: &ReportConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or(ReportError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(MistralClient {
            client,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
        })
    }

    /// Sends a single user prompt and returns the reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let messages = [ChatMessage::user(prompt)];
        let body = ChatRequest {
            model: &self.model,
            messages: &messages,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ReportError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatResponse = response.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ReportError::EmptyResponse)
    }

    /// Generates the English HTML activity report for a weather summary.
    pub async fn analyze(&self, location: &str, summary: &str) -> Result<String> {
        log::info!("Analyzing weather data with {}", self.model);
        self.complete(&super::analysis_prompt(location, summary)).await
    }

    /// Translates an HTML report to German, leaving the markup untouched.
    pub async fn translate(&self, html: &str) -> Result<String> {
        log::info!("Translating weather report to German");
        self.complete(&super::translation_prompt(html)).await
    }
}

// -- Tests -------------------------------------------------------------------
