/*!
 * Tests for configuration loading and validation
 */

use briefgen::app_config::{Config, LlmProvider, LogLevel, ProviderConfig};
use briefgen::language_utils::Language;

use crate::common;

fn ollama_config() -> Config {
    let mut config = Config::default();
    config.llm.provider = LlmProvider::Ollama;
    config
}

#[test]
fn test_config_serdeRoundTrip_shouldPreserveValues() {
    let mut config = ollama_config();
    config.output_language = "ka".to_string();
    config.brief.pages_per_batch = 8;
    config.log_level = LogLevel::Debug;

    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.llm.provider, LlmProvider::Ollama);
    assert_eq!(parsed.brief.pages_per_batch, 8);
    assert_eq!(parsed.log_level, LogLevel::Debug);
    assert_eq!(parsed.output_language().unwrap(), Some(Language::Georgian));
}

#[test]
fn test_config_fromPartialJson_shouldFillDefaults() {
    let json = r#"{
        "output_language": "en",
        "llm": { "provider": "ollama", "available_providers": [] },
        "brief": { "pages_per_batch": 6 },
        "storage": {},
        "log_level": "warn"
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.brief.pages_per_batch, 6);
    assert_eq!(config.brief.small_document_threshold, 15);
    assert_eq!(config.brief.retry_delay_ms, 1000);
    assert!(config.storage.enabled);
    assert!(config.storage.reuse_existing);
    assert_eq!(config.log_level, LogLevel::Warn);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_fromFile_shouldLoad() {
    let temp_dir = common::create_temp_dir().unwrap();
    let config = common::offline_config(temp_dir.path());
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        &serde_json::to_string_pretty(&config).unwrap(),
    )
    .unwrap();

    let loaded: Config = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(loaded.llm.provider, LlmProvider::Ollama);
    assert_eq!(loaded.brief.retry_delay_ms, 0);
    assert!(loaded.storage.database_path.unwrap().ends_with("briefs.db"));
}

#[test]
fn test_validate_withInvalidLanguage_shouldFail() {
    let mut config = ollama_config();
    config.output_language = "klingon".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withZeroBatchSize_shouldFail() {
    let mut config = ollama_config();
    config.brief.pages_per_batch = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withMinWordsAboveTarget_shouldFail() {
    let mut config = ollama_config();
    config.brief.min_words = 600;
    config.brief.target_words = 500;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withConfiguredApiKey_shouldPass() {
    let mut config = Config::default();
    config.llm.provider = LlmProvider::Anthropic;
    let mut provider = ProviderConfig::new(LlmProvider::Anthropic);
    provider.api_key = "sk-test".to_string();
    config.llm.available_providers = vec![provider];

    assert!(config.validate().is_ok());
    assert_eq!(config.llm.get_api_key(), "sk-test");
}

#[test]
fn test_llmConfig_withoutProviderEntry_shouldUseProviderDefaults() {
    let mut config = ollama_config();
    config.llm.available_providers.clear();

    assert_eq!(config.llm.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.llm.get_model(), ProviderConfig::new(LlmProvider::Ollama).model);
}

#[test]
fn test_llmProvider_fromStr_shouldBeCaseInsensitive() {
    assert_eq!("Gemini".parse::<LlmProvider>().unwrap(), LlmProvider::Gemini);
    assert_eq!("OLLAMA".parse::<LlmProvider>().unwrap(), LlmProvider::Ollama);
    assert!("openai".parse::<LlmProvider>().is_err());
}
