use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::gateway::{CompletionClient, CompletionError, CompletionFuture};
use crate::config::{ConfigError, require_http_url, require_non_blank};
use crate::config_env::{optional_trimmed_env, parse_number_env};
use crate::models::{ChatMessage, ChatRole};

const CHAT_COMPLETIONS_PATH: &str = "openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct GroqClientConfig {
    pub chat_completions_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl GroqClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let (chat_completions_url, api_key) = resolve_endpoint_and_key(
            optional_trimmed_env("GROQ_API_BASE_URL").as_deref(),
            optional_trimmed_env("GROQ_API_KEY").as_deref(),
        )?;

        Ok(Self {
            chat_completions_url,
            api_key,
            model: optional_trimmed_env("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_ms: parse_number_env("GROQ_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
        })
    }
}

/// Validates the two settings the relay cannot start without and returns the
/// resolved completions URL with the API key.
fn resolve_endpoint_and_key(
    base_url: Option<&str>,
    api_key: Option<&str>,
) -> Result<(String, String), ConfigError> {
    let base_url = require_http_url("GROQ_API_BASE_URL", base_url)?;
    let api_key = require_non_blank("GROQ_API_KEY", api_key)?;
    Ok((chat_completions_url(&base_url)?, api_key))
}

/// Resolves the OpenAI-compatible completions endpoint under a Groq base URL.
/// A base that already ends in the completions path is used as-is.
pub fn chat_completions_url(base_url: &str) -> Result<String, ConfigError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let joined = if trimmed.ends_with(CHAT_COMPLETIONS_PATH) {
        trimmed.to_string()
    } else if trimmed.ends_with("/openai/v1") {
        format!("{trimmed}/chat/completions")
    } else {
        format!("{trimmed}/{CHAT_COMPLETIONS_PATH}")
    };

    Url::parse(&joined)
        .map(|url| url.to_string())
        .map_err(|err| {
            ConfigError::InvalidConfiguration(format!("GROQ_API_BASE_URL is not a valid url: {err}"))
        })
}

#[derive(Clone)]
pub struct GroqCompletionClient {
    client: reqwest::Client,
    config: GroqClientConfig,
}

impl GroqCompletionClient {
    pub fn new(config: GroqClientConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn send(&self, messages: Vec<ChatMessage>) -> Result<ChatMessage, CompletionError> {
        if messages.is_empty() {
            return Err(CompletionError::EmptyRequest);
        }

        let request_body = GroqChatRequest {
            model: &self.config.model,
            messages: &messages,
        };

        let response = self
            .client
            .post(&self.config.chat_completions_url)
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    CompletionError::Timeout
                } else {
                    CompletionError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        let provider_request_id = header_request_id(response.headers());
        let body = response.text().await.map_err(|err| {
            if err.is_timeout() {
                CompletionError::Timeout
            } else {
                CompletionError::InvalidPayload("response_body_read_failed".to_string())
            }
        })?;

        if !status.is_success() {
            return Err(CompletionError::ProviderFailure {
                status: status.as_u16(),
                code: parse_provider_error_code(&body),
            });
        }

        let parsed: GroqSuccessResponse = serde_json::from_str(&body).map_err(|_| {
            CompletionError::InvalidPayload("response_json_parse_failed".to_string())
        })?;

        if let Some(usage) = &parsed.usage {
            debug!(
                provider_request_id = provider_request_id.as_deref().unwrap_or("none"),
                model = parsed.model.as_deref().unwrap_or(self.config.model.as_str()),
                prompt_tokens = usage.prompt_tokens.unwrap_or_default(),
                completion_tokens = usage.completion_tokens.unwrap_or_default(),
                total_tokens = usage.total_tokens.unwrap_or_default(),
                "groq completion succeeded"
            );
        }

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyCompletion)?;

        Ok(ChatMessage {
            role: ChatRole::Assistant,
            content,
        })
    }
}

impl CompletionClient for GroqCompletionClient {
    fn complete<'a>(&'a self, messages: Vec<ChatMessage>) -> CompletionFuture<'a> {
        Box::pin(self.send(messages))
    }
}

#[derive(Debug, Serialize)]
struct GroqChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct GroqSuccessResponse {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<GroqChoice>,
    usage: Option<GroqUsage>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqMessage,
}

#[derive(Debug, Deserialize)]
struct GroqMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroqUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

fn header_request_id(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

fn parse_provider_error_code(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<ProviderErrorDetails>,
    }

    #[derive(Deserialize)]
    struct ProviderErrorDetails {
        code: Option<Value>,
        #[serde(rename = "type")]
        kind: Option<Value>,
    }

    let Some(details) = serde_json::from_str::<ProviderErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
    else {
        return "unknown".to_string();
    };

    match details.code.or(details.kind) {
        Some(Value::String(code)) => code,
        Some(Value::Number(code)) => code.to_string(),
        _ => "unknown".to_string(),
    }
}
