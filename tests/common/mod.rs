/*!
 * Common test utilities for the briefgen test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use briefgen::app_config::{Config, LlmProvider};
use briefgen::brief::{BriefOptions, BriefService};
use briefgen::providers::mock::MockProvider;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// English lecture pages
pub fn english_pages(count: usize) -> Vec<String> {
    (1..=count)
        .map(|n| format!("Lecture {} covers cell structure, membranes and the role of organelles.", n))
        .collect()
}

/// Georgian lecture pages
pub fn georgian_pages(count: usize) -> Vec<String> {
    (1..=count)
        .map(|n| format!("ლექცია {}: უჯრედის აგებულება და ორგანელების ფუნქციები.", n))
        .collect()
}

/// A well-formed model reply for the given pages
pub fn brief_json(entries: &[(usize, &str, &str)]) -> String {
    let summaries: Vec<serde_json::Value> = entries
        .iter()
        .map(|(page, title, summary)| serde_json::json!({ "pageNumber": page, "title": title, "summary": summary }))
        .collect();
    serde_json::json!({ "pageSummaries": summaries }).to_string()
}

/// Default options without the pause between attempts
pub fn fast_options() -> BriefOptions {
    BriefOptions::default().with_retry_delay(Duration::ZERO)
}

/// Brief service over a mock provider
pub fn service_with(provider: &MockProvider) -> BriefService {
    BriefService::new(Arc::new(provider.clone()), fast_options())
}

/// Config that needs no API key and no data directory
pub fn offline_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.llm.provider = LlmProvider::Ollama;
    config.brief.retry_delay_ms = 0;
    config.storage.database_path = Some(dir.join("briefs.db").to_string_lossy().to_string());
    config
}
