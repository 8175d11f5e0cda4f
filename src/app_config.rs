use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::language_utils::Language;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Output language code (ISO) or "auto" to follow the document
    #[serde(default = "default_output_language")]
    pub output_language: String,

    /// LLM provider settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Brief generation settings
    #[serde(default)]
    pub brief: BriefConfig,

    /// Persistence settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// LLM provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama (local)
    Ollama,
}

impl LlmProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }

    // @returns: Environment variable consulted when no API key is configured
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama => None,
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: USD per million prompt tokens
    #[serde(default)]
    pub input_price_per_million: f64,

    // @field: USD per million completion tokens
    #[serde(default)]
    pub output_price_per_million: f64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: LlmProvider) -> Self {
        match provider_type {
            LlmProvider::Gemini => Self {
                provider_type: "gemini".to_string(),
                model: default_gemini_model(),
                api_key: String::new(),
                endpoint: default_gemini_endpoint(),
                timeout_secs: default_timeout_secs(),
                input_price_per_million: 0.10,
                output_price_per_million: 0.40,
            },
            LlmProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                timeout_secs: default_timeout_secs(),
                input_price_per_million: 0.80,
                output_price_per_million: 4.00,
            },
            LlmProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_ollama_timeout_secs(),
                input_price_per_million: 0.0,
                output_price_per_million: 0.0,
            },
        }
    }
}

/// LLM configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: LlmProvider,

    /// Available providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,
}

/// Settings for the brief pipeline
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BriefConfig {
    /// Documents with at most this many readable pages go out as one batch
    #[serde(default = "default_small_document_threshold")]
    pub small_document_threshold: usize,

    /// Pages per batch for larger documents
    #[serde(default = "default_pages_per_batch")]
    pub pages_per_batch: usize,

    /// Upper bound on page characters per batch
    #[serde(default = "default_max_chars_per_batch")]
    pub max_chars_per_batch: usize,

    /// Batches launched together; provider profile default when unset
    #[serde(default)]
    pub max_parallel_batches: Option<usize>,

    /// Attempts per batch before falling back to placeholders
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,

    /// Pause between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Temperature of the first attempt (0.0 to 1.0)
    /// Each retry lowers it by 0.1, never below 0.1
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token limit per request
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Minimum words per page summary
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    /// Target upper word count per page summary
    #[serde(default = "default_target_words")]
    pub target_words: usize,

    /// Minimum dominant-script share for a field to conform
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Maximum other-script share for a field to conform
    #[serde(default = "default_mixing_tolerance")]
    pub mixing_tolerance: f64,
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            small_document_threshold: default_small_document_threshold(),
            pages_per_batch: default_pages_per_batch(),
            max_chars_per_batch: default_max_chars_per_batch(),
            max_parallel_batches: None,
            max_retry_attempts: default_max_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            min_words: default_min_words(),
            target_words: default_target_words(),
            min_confidence: default_min_confidence(),
            mixing_tolerance: default_mixing_tolerance(),
        }
    }
}

/// Persistence settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Whether generated briefs are saved
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Database file; the user data directory is used when empty
    #[serde(default)]
    pub database_path: Option<String>,

    /// Return a stored brief for an identical document instead of regenerating
    #[serde(default = "default_true")]
    pub reuse_existing: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_path: None,
            reuse_existing: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_output_language() -> String {
    "auto".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_ollama_timeout_secs() -> u64 {
    300
}

fn default_small_document_threshold() -> usize {
    15
}

fn default_pages_per_batch() -> usize {
    12
}

fn default_max_chars_per_batch() -> usize {
    60_000
}

fn default_max_retry_attempts() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.4
}

fn default_max_output_tokens() -> u32 {
    32_768
}

fn default_min_words() -> usize {
    300
}

fn default_target_words() -> usize {
    500
}

fn default_min_confidence() -> f64 {
    0.8
}

fn default_mixing_tolerance() -> f64 {
    0.1
}

fn default_true() -> bool {
    true
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_ollama_model() -> String {
    "llama3.1".to_string()
}

impl Config {
    /// Resolved output language; `None` means follow the document
    pub fn output_language(&self) -> Result<Option<Language>> {
        let value = self.output_language.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("auto") {
            return Ok(None);
        }
        Ok(Some(value.parse()?))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.output_language()?;

        if let Some(env_var) = self.llm.provider.api_key_env_var() {
            if self.llm.get_api_key().is_empty() {
                return Err(anyhow!(
                    "An API key is required for the {} provider (set it in the config or {})",
                    self.llm.provider.display_name(),
                    env_var
                ));
            }
        }

        let brief = &self.brief;
        if brief.pages_per_batch == 0 {
            return Err(anyhow!("brief.pages_per_batch must be at least 1"));
        }
        if brief.max_retry_attempts == 0 {
            return Err(anyhow!("brief.max_retry_attempts must be at least 1"));
        }
        if brief.max_parallel_batches == Some(0) {
            return Err(anyhow!("brief.max_parallel_batches must be at least 1"));
        }
        if brief.min_words > brief.target_words {
            return Err(anyhow!(
                "brief.min_words ({}) cannot exceed brief.target_words ({})",
                brief.min_words,
                brief.target_words
            ));
        }
        if !(0.0..=1.0).contains(&brief.min_confidence) || !(0.0..=1.0).contains(&brief.mixing_tolerance) {
            return Err(anyhow!("brief.min_confidence and brief.mixing_tolerance must be between 0 and 1"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            output_language: default_output_language(),
            llm: LlmConfig::default(),
            brief: BriefConfig::default(),
            storage: StorageConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl LlmConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Active provider configuration, falling back to the built-in defaults
    pub fn active_provider_config(&self) -> ProviderConfig {
        self.get_active_provider_config()
            .cloned()
            .unwrap_or_else(|| ProviderConfig::new(self.provider))
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        ProviderConfig::new(self.provider).model
    }

    /// Get the API key for the active provider, consulting the environment last
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.provider
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        ProviderConfig::new(self.provider).endpoint
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            available_providers: vec![
                ProviderConfig::new(LlmProvider::Gemini),
                ProviderConfig::new(LlmProvider::Anthropic),
                ProviderConfig::new(LlmProvider::Ollama),
            ],
        }
    }
}
