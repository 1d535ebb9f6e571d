// External dependencies
use anyhow::{Context, Result};
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

// Internal dependencies
use crate::ai::prompt::ChatPrompt;
use crate::config::Settings;

/// Request-scoped failures of the chat-completion call. Every variant's
/// display text is shown to the user as-is, so the credential-shaped
/// statuses carry their remediation hints here.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClientError {
    #[error(
        "no API key configured; set XAI_API_KEY or add api_key to the config file \
         (keys are issued at https://x.ai/api)"
    )]
    MissingApiKey,

    #[error("the API rejected the credential (HTTP {0}); verify the key at https://x.ai/api")]
    BadCredential(u16),

    #[error(
        "endpoint or model not found (HTTP 404); check base_url and model \
         against https://docs.x.ai"
    )]
    NotFound,

    #[error("the API returned HTTP {0}")]
    Status(u16),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(String),

    #[error("could not decode the API response: {0}")]
    Malformed(String),
}

// ============================================================================
// Chat Completion Wire Structures
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    // Reasoning models leave `content` empty and put the text here.
    #[serde(default)]
    reasoning_content: Option<String>,
}

// ============================================================================
// Client Implementation
// ============================================================================

/// One configured chat client per process, built at startup and passed into
/// the request path. The API key is resolved at construction but only
/// required when a request is actually sent, so key-less invocations can
/// still run the offline subcommands.
pub struct ChatClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_secs: u64,
}

impl ChatClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let timeout_secs = settings.api.timeout_secs;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let endpoint = Url::parse(&format!(
            "{}/chat/completions",
            settings.api.base_url.trim_end_matches('/')
        ))
        .context("Invalid API base URL")?;

        Ok(Self {
            client,
            endpoint,
            api_key: settings.api.api_key.clone(),
            model: settings.model.name.clone(),
            temperature: settings.model.temperature,
            max_tokens: settings.model.max_tokens,
            timeout_secs,
        })
    }

    /// Sends one chat completion and returns the raw completion text.
    ///
    /// The text is untrusted and may be empty, truncated, or wrapped in
    /// commentary; the normalizer deals with that. A single retry is made
    /// on transient transport failure.
    pub async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ClientError> {
        if self.api_key.is_none() {
            return Err(ClientError::MissingApiKey);
        }

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user.clone(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send(&request).await {
                Err(err @ (ClientError::Timeout(_) | ClientError::Network(_))) if attempt == 1 => {
                    warn!("Transient transport failure, retrying once: {err}");
                }
                other => return other,
            }
        }
    }

    async fn send(&self, request: &ChatCompletionRequest) -> Result<String, ClientError> {
        debug!("Sending chat completion to {}", self.endpoint);

        let api_key = self.api_key.as_deref().ok_or(ClientError::MissingApiKey)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if let Some(err) = classify_status(response.status()) {
            return Err(err);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        let content = decode_completion(&body)?;

        info!("Received completion, {} bytes", content.len());
        Ok(content)
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Decodes a chat-completion body and pulls out the completion text. An
/// absent or empty choice decodes to an empty string, which the normalizer
/// reports as a missing table.
fn decode_completion(body: &[u8]) -> Result<String, ClientError> {
    let completion: ChatCompletionResponse = serde_json::from_slice(body)
        .map_err(|e| ClientError::Malformed(format!("not a chat completion: {e}")))?;

    Ok(completion
        .choices
        .into_iter()
        .next()
        .map(|choice| {
            choice
                .message
                .content
                .filter(|text| !text.is_empty())
                .or(choice.message.reasoning_content)
                .unwrap_or_default()
        })
        .unwrap_or_default())
}

/// Maps a response status to the error taxonomy. 401/403 and 404 get
/// tailored remediation text, everything else non-2xx a generic message
/// carrying the code.
fn classify_status(status: StatusCode) -> Option<ClientError> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Some(ClientError::BadCredential(status.as_u16()))
        }
        StatusCode::NOT_FOUND => Some(ClientError::NotFound),
        other if !other.is_success() => Some(ClientError::Status(other.as_u16())),
        _ => None,
    }
}
