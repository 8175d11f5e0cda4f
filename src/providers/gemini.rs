use std::time::{Duration, Instant};
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use reqwest::Client;
use log::{debug, error};
use url::Url;

use crate::errors::ProviderError;
use super::{Generation, GenerationRequest, Provider, TokenUsage};

/// Gemini client for the Google Generative Language API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, including the version segment
    endpoint: String,
    /// Model name, e.g. "gemini-2.0-flash"
    model: String,
}

/// generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation turns
    contents: Vec<GeminiContent>,

    /// Sampling settings
    generation_config: GeminiGenerationConfig,
}

/// One conversation turn
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Role of the author (user, model)
    #[serde(default)]
    pub role: String,

    /// Content parts
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A text part
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    /// The text
    #[serde(default)]
    pub text: String,
}

/// Generation settings
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    /// Temperature for generation
    temperature: f32,

    /// Maximum number of tokens to generate
    max_output_tokens: u32,

    /// Ask the model for a JSON document
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Generated candidates
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,

    /// Token usage information
    #[serde(default)]
    pub usage_metadata: Option<GeminiUsage>,
}

/// A generated candidate
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// Candidate content
    pub content: Option<GeminiContent>,

    /// Why generation stopped (STOP, MAX_TOKENS, SAFETY, ...)
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsage {
    /// Number of prompt tokens
    #[serde(default)]
    pub prompt_token_count: u64,
    /// Number of generated tokens
    #[serde(default)]
    pub candidates_token_count: u64,
}

impl GeminiRequest {
    /// Create a single-turn JSON request
    pub fn from_generation(request: &GenerationRequest) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart { text: request.prompt.clone() }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
                response_mime_type: Some("application/json".to_string()),
            },
        }
    }
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    /// Build a model URL with the API key attached
    fn model_url(&self, suffix: &str) -> Result<Url, ProviderError> {
        let base = if self.endpoint.is_empty() {
            "https://generativelanguage.googleapis.com/v1beta"
        } else {
            self.endpoint.trim_end_matches('/')
        };

        let mut url = Url::parse(&format!("{}/models/{}{}", base, self.model, suffix))
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid Gemini endpoint: {}", e)))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Send a generateContent request
    pub async fn complete(&self, request: GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let url = self.model_url(":generateContent")?;

        let response = self.client.post(url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gemini API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response.json::<GeminiResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Gemini API response: {}", e)))
    }

    /// Extract text from the first candidate
    pub fn extract_text(response: &GeminiResponse) -> String {
        response.candidates.first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for Gemini {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, ProviderError> {
        let start = Instant::now();
        let response = self.complete(GeminiRequest::from_generation(&request)).await?;

        if let Some(reason) = response.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
            if reason != "STOP" {
                debug!("Gemini finished with reason {}", reason);
            }
        }

        let text = Self::extract_text(&response);
        if text.trim().is_empty() {
            return Err(ProviderError::ParseError("Gemini returned no text".to_string()));
        }

        Ok(Generation {
            text,
            usage: TokenUsage {
                prompt_tokens: response.usage_metadata.as_ref().map(|u| u.prompt_token_count),
                completion_tokens: response.usage_metadata.as_ref().map(|u| u.candidates_token_count),
                duration: start.elapsed(),
            },
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = self.model_url("")?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ProviderError::from_status(status.as_u16(), message))
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
