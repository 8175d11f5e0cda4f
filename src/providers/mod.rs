/*!
 * Provider implementations for the text generation backends.
 *
 * This module contains client implementations for various LLM providers:
 * - Gemini: Google Generative Language API
 * - Anthropic: Anthropic Messages API
 * - Ollama: Local LLM server
 * - Mock: Scripted provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use crate::errors::ProviderError;

/// A single text generation request, independent of the backend
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Full prompt text
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Output token limit
    pub max_output_tokens: u32,
}

impl GenerationRequest {
    /// Create a new request
    pub fn new(prompt: impl Into<String>, temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            max_output_tokens,
        }
    }
}

/// Token counts reported by a provider for one call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TokenUsage {
    /// Prompt tokens, if reported
    pub prompt_tokens: Option<u64>,
    /// Completion tokens, if reported
    pub completion_tokens: Option<u64>,
    /// Wall time of the request
    pub duration: Duration,
}

/// Raw text produced by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// Generated text, expected to contain one JSON object
    pub text: String,
    /// Usage for this call
    pub usage: TokenUsage,
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the brief service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Run one generation request
    ///
    /// # Arguments
    /// * `request` - Prompt and sampling settings
    ///
    /// # Returns
    /// * `Result<Generation, ProviderError>` - The generated text or an error
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short provider name for logs and stored records
    fn name(&self) -> &str;

    /// Model identifier
    fn model(&self) -> &str;
}

/// Temperature for a given 1-based attempt
///
/// Each retry lowers the temperature by 0.1, with a floor of 0.1.
pub fn retry_temperature(base: f32, attempt: u32) -> f32 {
    let lowered = base - 0.1 * attempt.saturating_sub(1) as f32;
    lowered.max(0.1)
}

pub mod gemini;
pub mod anthropic;
pub mod ollama;
pub mod mock;
