/*!
 * Ollama client for locally served models.
 *
 * Uses the non-streaming `/api/generate` endpoint with JSON mode on, so
 * the model is constrained to emit a single JSON value.
 */

use async_trait::async_trait;
use log::{error, warn};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::errors::ProviderError;
use super::{Generation, GenerationRequest, Provider, TokenUsage};

/// Ollama client
#[derive(Debug)]
pub struct Ollama {
    base_url: String,
    client: Client,
    model: String,
}

/// Body of `POST /api/generate`
#[derive(Debug, Serialize)]
pub struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    format: &'static str,
    stream: bool,
    options: SamplingOptions,
}

#[derive(Debug, Serialize)]
struct SamplingOptions {
    temperature: f32,
    num_predict: u32,
}

/// Reply of `POST /api/generate`
#[derive(Debug, Deserialize)]
pub struct GenerateReply {
    pub response: String,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct VersionReply {
    version: String,
}

impl Ollama {
    /// Create a client for a base URL such as "http://localhost:11434"
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            model: model.into(),
        }
    }

    fn body<'a>(&'a self, request: &'a GenerationRequest) -> GenerateBody<'a> {
        GenerateBody {
            model: &self.model,
            prompt: &request.prompt,
            format: "json",
            stream: false,
            options: SamplingOptions {
                temperature: request.temperature,
                num_predict: request.max_output_tokens,
            },
        }
    }

    async fn check(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        error!("Ollama returned {}: {}", status, body);
        Err(ProviderError::from_status(status.as_u16(), body))
    }

    /// Call `/api/generate`
    pub async fn send(&self, body: &GenerateBody<'_>) -> Result<GenerateReply, ProviderError> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(body)
            .send()
            .await?;

        Self::check(response)
            .await?
            .json::<GenerateReply>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Unexpected Ollama response: {}", e)))
    }

    /// Server version, from `/api/version`
    pub async fn version(&self) -> Result<String, ProviderError> {
        let response = self.client.get(format!("{}/api/version", self.base_url)).send().await?;
        let reply = Self::check(response)
            .await?
            .json::<VersionReply>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        Ok(reply.version)
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, ProviderError> {
        let started = Instant::now();
        let reply = self.send(&self.body(&request)).await?;

        if reply.done_reason.as_deref() == Some("length") {
            warn!("Ollama output hit the {} token limit", request.max_output_tokens);
        }

        Ok(Generation {
            text: reply.response,
            usage: TokenUsage {
                prompt_tokens: reply.prompt_eval_count,
                completion_tokens: reply.eval_count,
                duration: started.elapsed(),
            },
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.version().await.map(|_| ())
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
