/*!
 * Anthropic Messages API client.
 */

use async_trait::async_trait;
use log::{error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::errors::ProviderError;
use super::{Generation, GenerationRequest, Provider, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const SYSTEM_PROMPT: &str = "You write structured study notes and reply with a single JSON object.";

/// Anthropic client
#[derive(Debug)]
pub struct Anthropic {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

/// Body of `POST /v1/messages`
#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Reply of `POST /v1/messages`
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    pub usage: MessagesUsage,
}

/// One content block; only `text` blocks carry output
#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagesUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl MessagesResponse {
    /// Concatenated text blocks
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect()
    }

    /// Whether generation stopped at the token limit
    pub fn is_truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }
}

impl Anthropic {
    /// Create a client; an empty `base_url` means the public API
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            base_url: if base_url.is_empty() { DEFAULT_BASE_URL.to_string() } else { base_url },
            model: model.into(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }

    fn messages_request<'a>(&'a self, request: &'a GenerationRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: request.max_output_tokens,
            system: Some(SYSTEM_PROMPT),
            temperature: Some(request.temperature),
            messages: vec![Message { role: "user", content: &request.prompt }],
        }
    }

    /// Send one messages request
    pub async fn send(&self, body: &MessagesRequest<'_>) -> Result<MessagesResponse, ProviderError> {
        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Anthropic returned {}: {}", status, body);
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Unexpected Anthropic response: {}", e)))
    }
}

#[async_trait]
impl Provider for Anthropic {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, ProviderError> {
        let started = Instant::now();
        let response = self.send(&self.messages_request(&request)).await?;

        if response.is_truncated() {
            warn!("Anthropic output hit the {} token limit", request.max_output_tokens);
        }

        Ok(Generation {
            text: response.text(),
            usage: TokenUsage {
                prompt_tokens: Some(response.usage.input_tokens),
                completion_tokens: Some(response.usage.output_tokens),
                duration: started.elapsed(),
            },
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let ping = GenerationRequest::new("ping", 0.0, 8);
        self.send(&self.messages_request(&ping)).await.map(|_| ())
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
