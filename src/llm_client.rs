use crate::errors::AppError;
use crate::models::ChatMessage;
use serde::{Deserialize, Serialize};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const OPENROUTER_MODEL: &str = "mistralai/devstral-2512:free";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_MODEL: &str = "llama-3.1-70b-versatile";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1024;

/// Which hosted completion endpoint to call, and with which key.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmProvider {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl LlmProvider {
    /// Selects the provider from the configured keys.
    ///
    /// OpenRouter wins when both keys are present.
    pub fn from_keys(openrouter_key: Option<&str>, groq_key: Option<&str>) -> Result<Self, AppError> {
        if let Some(key) = openrouter_key {
            return Ok(Self {
                api_key: key.to_string(),
                base_url: OPENROUTER_BASE_URL.to_string(),
                model: OPENROUTER_MODEL.to_string(),
            });
        }
        if let Some(key) = groq_key {
            return Ok(Self {
                api_key: key.to_string(),
                base_url: GROQ_BASE_URL.to_string(),
                model: GROQ_MODEL.to_string(),
            });
        }
        Err(AppError::ConfigError(
            "Please add your OPENROUTER_API_KEY or GROQ_API_KEY".to_string(),
        ))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Pulls `error.message` out of an OpenAI-style error body.
fn provider_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Client for an OpenAI-compatible chat completion API.
///
/// One blocking request per call: no retry, no streaming.
#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    provider: LlmProvider,
    site_url: String,
}

impl LlmClient {
    pub fn new(provider: LlmProvider, site_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider,
            site_url,
        }
    }

    pub fn model(&self) -> &str {
        &self.provider.model
    }

    /// Sends the conversation and returns the top choice's text.
    ///
    /// An empty string is returned when the provider answers without content.
    pub async fn chat_completion(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
        let url = format!(
            "{}/chat/completions",
            self.provider.base_url.trim_end_matches('/')
        );
        tracing::info!(
            "Requesting chat completion ({} messages, model {})",
            messages.len(),
            self.provider.model
        );

        let body = ChatCompletionRequest {
            model: &self.provider.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.provider.api_key))
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", "Clinic AI Chatbot")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("LLM request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            let message = provider_error_message(&error_text)
                .unwrap_or_else(|| "AI request failed".to_string());
            tracing::error!("LLM provider returned {}: {}", status, message);
            return Err(AppError::ExternalApiError(message));
        }

        let data: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse LLM response: {}", e))
        })?;

        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default();

        tracing::debug!("✓ Chat completion received ({} chars)", content.len());
        Ok(content)
    }
}
