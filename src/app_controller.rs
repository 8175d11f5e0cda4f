use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::{Config, LlmProvider};
use crate::brief::{BriefOptions, BriefResult, BriefService, ProviderProfile};
use crate::database::{BriefRecord, DatabaseConnection, DatabaseStats, Repository};
use crate::file_utils::FileManager;
use crate::language_utils::{detect_document_language, Language};
use crate::providers::anthropic::Anthropic;
use crate::providers::gemini::Gemini;
use crate::providers::ollama::Ollama;
use crate::providers::Provider;

// @module: Application controller for brief generation

/// Options for one `generate` run
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    // @field: Input pages (directory, JSON array or form-feed text)
    pub input: PathBuf,
    // @field: Output file, defaults to `<stem>.brief.<lang>.json` next to the input
    pub output: Option<PathBuf>,
    // @field: Output language, overrides the config
    pub language: Option<Language>,
    // @field: Whether to read and write the brief store
    pub store: bool,
    // @field: Regenerate even if output or a stored brief exists
    pub force: bool,
}

impl GenerateRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            language: None,
            store: true,
            force: false,
        }
    }
}

/// What a `generate` run produced
#[derive(Debug, Clone)]
pub struct GenerateReport {
    /// Where the brief was written
    pub output_path: PathBuf,
    /// The brief
    pub brief: BriefResult,
    /// Language of the brief
    pub language: Language,
    /// Whether a stored brief was reused instead of calling the provider
    pub reused: bool,
    /// ID in the brief store, if stored
    pub brief_id: Option<String>,
}

/// Main application controller for brief generation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create the provider client for the configured backend
    pub fn build_provider(&self) -> Arc<dyn Provider> {
        let llm = &self.config.llm;
        let settings = llm.active_provider_config();

        match llm.provider {
            LlmProvider::Gemini => Arc::new(Gemini::new(
                llm.get_api_key(),
                llm.get_endpoint(),
                llm.get_model(),
                settings.timeout_secs,
            )),
            LlmProvider::Anthropic => Arc::new(Anthropic::new(
                llm.get_api_key(),
                llm.get_endpoint(),
                llm.get_model(),
                settings.timeout_secs,
            )),
            LlmProvider::Ollama => Arc::new(Ollama::new(llm.get_endpoint(), llm.get_model(), settings.timeout_secs)),
        }
    }

    /// Brief settings for the configured provider
    pub fn brief_options(&self) -> BriefOptions {
        BriefOptions::from_config(&self.config.brief, ProviderProfile::for_provider(self.config.llm.provider))
    }

    /// Open the brief store named in the configuration
    pub fn open_repository(&self) -> Result<Repository> {
        let db = match &self.config.storage.database_path {
            Some(path) => DatabaseConnection::new(path)?,
            None => DatabaseConnection::new_default()?,
        };
        Ok(Repository::new(db))
    }

    /// Generate a brief with the configured provider
    pub async fn generate(&self, request: GenerateRequest) -> Result<Option<GenerateReport>> {
        let repository = if request.store && self.config.storage.enabled {
            Some(self.open_repository().context("Failed to open brief store")?)
        } else {
            None
        };
        self.generate_with(self.build_provider(), repository.as_ref(), request).await
    }

    /// Generate a brief with an explicit provider and store
    ///
    /// Returns `None` when the output file exists and `force` is not set.
    pub async fn generate_with(
        &self,
        provider: Arc<dyn Provider>,
        repository: Option<&Repository>,
        request: GenerateRequest,
    ) -> Result<Option<GenerateReport>> {
        let start_time = Instant::now();

        let pages = FileManager::load_pages(&request.input)
            .with_context(|| format!("Failed to load pages from {:?}", request.input))?;
        let language = match request.language.or(self.config.output_language()?) {
            Some(language) => language,
            None => {
                let detected = detect_document_language(&pages);
                info!("Detected document language: {}", detected.display_name());
                detected
            }
        };

        let output_path = request
            .output
            .clone()
            .unwrap_or_else(|| FileManager::generate_output_path(&request.input, language.iso_code()));
        if output_path.exists() && !request.force {
            warn!("Skipping, brief already exists at {:?} (use --force to overwrite)", output_path);
            return Ok(None);
        }

        let source_name = source_name(&request.input);
        let document_hash = Repository::hash_document(&pages);

        if let Some(repository) = repository.filter(|_| self.config.storage.reuse_existing && !request.force) {
            if let Some(stored) = repository.find_by_document_hash(&document_hash, language.iso_code()).await? {
                info!("Reusing stored brief {} for {}", stored.record.id, source_name);
                let brief = stored.to_brief();
                FileManager::write_json(&output_path, &brief)?;
                info!("Success: {}", output_path.display());
                return Ok(Some(GenerateReport {
                    output_path,
                    brief,
                    language,
                    reused: true,
                    brief_id: Some(stored.record.id),
                }));
            }
        }

        info!("{} - {}", provider.name(), provider.model());
        if let Err(e) = provider.test_connection().await {
            warn!("Connection check for {} failed, continuing: {}", provider.name(), e);
        }
        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Summarizing");

        let pb = progress_bar.clone();
        let service = BriefService::new(provider.clone(), self.brief_options()).with_progress(move |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        });
        let outcome = service.generate(&pages, Some(language)).await;
        progress_bar.finish_and_clear();

        if let Some(error) = &outcome.brief.error {
            warn!("Brief is degraded: {}", error);
        }
        if outcome.usage.requests > 0 {
            let settings = self.config.llm.active_provider_config();
            info!("{}", outcome.usage.summary());
            info!(
                "Estimated cost: ${:.4}",
                outcome
                    .usage
                    .estimated_cost(settings.input_price_per_million, settings.output_price_per_million)
            );
        }

        let brief_id = match repository {
            Some(repository) if !outcome.brief.page_summaries.is_empty() => {
                let record = BriefRecord::new(
                    document_hash,
                    source_name,
                    language.iso_code().to_string(),
                    provider.name().to_string(),
                    provider.model().to_string(),
                    &outcome.brief,
                );
                repository
                    .save_brief(&record, &outcome.brief.page_summaries)
                    .await
                    .context("Failed to store brief")?;
                Some(record.id)
            }
            _ => None,
        };

        FileManager::write_json(&output_path, &outcome.brief)?;
        info!(
            "Success: {} ({} pages in {})",
            output_path.display(),
            outcome.brief.page_summaries.len(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(Some(GenerateReport {
            output_path,
            brief: outcome.brief,
            language: outcome.language,
            reused: false,
            brief_id,
        }))
    }

    /// Stored briefs, newest first
    pub async fn list(&self, limit: Option<usize>) -> Result<Vec<BriefRecord>> {
        self.open_repository()?.list_briefs(limit).await
    }

    /// Delete a stored brief; returns whether it existed
    pub async fn delete(&self, brief_id: &str) -> Result<bool> {
        self.open_repository()?.delete_brief(brief_id).await
    }

    /// Size of the brief store
    pub fn store_stats(&self) -> Result<DatabaseStats> {
        self.open_repository()?.connection().stats()
    }

    /// A stored brief in its wire form
    pub async fn show(&self, brief_id: &str) -> Result<BriefResult> {
        self.open_repository()?
            .get_brief(brief_id)
            .await?
            .map(|stored| stored.to_brief())
            .ok_or_else(|| anyhow!("No brief with id {}", brief_id))
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

fn source_name(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| input.display().to_string())
}
