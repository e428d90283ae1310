use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;

use crate::config::OpenAiConfig;
use crate::error::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_TOKENS: u32 = 150;

/// Thin chat-completions client for the two assistant endpoints.
#[derive(Clone)]
pub struct AssistantClient {
    http: Client,
    api_base: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl AssistantClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(AssistantClient {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Free-form help with formulating a question.
    pub async fn reply(&self, message: &str) -> Result<String, AppError> {
        self.complete(message, 0.7).await
    }

    /// Rewrite a transcribed voice question into a clear one.
    pub async fn clarify_question(&self, voice_input: &str) -> Result<String, AppError> {
        let prompt = format!(
            "Please rewrite the following question so it is clear and easy to understand:\n\n{}",
            voice_input
        );
        self.complete(&prompt, 0.5).await
    }

    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, AppError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
            temperature,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("OpenAI request failed: {}", e);
                AppError::UpstreamUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("OpenAI returned {}: {}", status, body);
            return Err(AppError::UpstreamUnavailable(format!(
                "provider returned {}",
                status
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!("Unreadable OpenAI response: {}", e);
            AppError::UpstreamUnavailable(e.to_string())
        })?;

        completion
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| AppError::UpstreamUnavailable("provider returned no choices".to_string()))
    }
}
