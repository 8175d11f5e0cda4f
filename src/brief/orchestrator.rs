/*!
 * Batch orchestration.
 *
 * Each batch goes through a small state machine: up to
 * `max_retry_attempts` attempts of prompt, provider call, response repair
 * and language enforcement, then fallback placeholders if every attempt
 * failed. Batches run in parallel groups; a group is awaited in full
 * before the next one starts. The merged brief is always returned, even
 * when some batches degraded to placeholders.
 */

use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::BriefConfig;
use crate::errors::BriefError;
use crate::language_utils::{detect_document_language, Language};
use crate::providers::{retry_temperature, GenerationRequest, Provider};

use super::batch::{parallel_groups, BatchPlanner};
use super::concurrency::ProviderProfile;
use super::document::{Batch, BriefResult, PageSummary, PageText};
use super::language_guard::{LanguageGuard, LanguageReport};
use super::placeholders::placeholder_page;
use super::prompts::BriefPromptBuilder;
use super::response::parse_and_validate;
use super::usage::UsageLedger;

/// Message stored on a brief built from a document without readable text
pub const NO_READABLE_PAGES: &str = "Document has no readable pages";

/// Progress callback receiving `(completed_batches, total_batches)`
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Settings for brief generation
#[derive(Debug, Clone)]
pub struct BriefOptions {
    /// Splits pages into batches
    pub planner: BatchPlanner,
    /// Checks the output language
    pub guard: LanguageGuard,
    /// Batches launched together
    pub max_parallel_batches: usize,
    /// Attempts per batch, including the first
    pub max_retry_attempts: u32,
    /// Pause between attempts
    pub retry_delay: Duration,
    /// Temperature of the first attempt
    pub temperature: f32,
    /// Output token limit per request
    pub max_output_tokens: u32,
    /// Word band requested per summary
    pub min_words: usize,
    pub target_words: usize,
}

impl Default for BriefOptions {
    fn default() -> Self {
        Self::from_config(&BriefConfig::default(), ProviderProfile::default())
    }
}

impl BriefOptions {
    /// Build options from configuration and the provider's profile
    pub fn from_config(config: &BriefConfig, profile: ProviderProfile) -> Self {
        Self {
            planner: BatchPlanner::from_config(config),
            guard: LanguageGuard::from_config(config),
            max_parallel_batches: profile.effective_parallel_batches(config.max_parallel_batches),
            max_retry_attempts: config.max_retry_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            min_words: config.min_words,
            target_words: config.target_words,
        }
    }

    /// Set the pause between attempts
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

/// What happened to one batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// 0-based batch index
    pub index: usize,
    /// Pages in the batch
    pub page_count: usize,
    /// Provider attempts made
    pub attempts: u32,
    /// Whether the batch ended with placeholder content for every page
    pub used_fallback: bool,
    /// Pages replaced by the language guard
    pub replaced_pages: Vec<usize>,
    /// Error of the last failed attempt
    pub last_error: Option<String>,
}

/// Result of processing one batch
#[derive(Debug, Clone)]
struct BatchOutcome {
    summaries: Vec<PageSummary>,
    report: BatchReport,
    usage: UsageLedger,
}

/// Complete result of a generation run
#[derive(Debug, Clone)]
pub struct BriefOutcome {
    /// The brief
    pub brief: BriefResult,
    /// Usage over all batches
    pub usage: UsageLedger,
    /// Per-batch reports, in batch order
    pub batches: Vec<BatchReport>,
    /// Output language used
    pub language: Language,
}

impl BriefOutcome {
    /// Number of batches that fell back to placeholders
    pub fn fallback_batches(&self) -> usize {
        self.batches.iter().filter(|b| b.used_fallback).count()
    }

    /// Total provider attempts
    pub fn total_attempts(&self) -> u32 {
        self.batches.iter().map(|b| b.attempts).sum()
    }
}

/// Generates briefs with a provider
pub struct BriefService {
    provider: Arc<dyn Provider>,
    options: BriefOptions,
    progress: Option<ProgressCallback>,
}

impl BriefService {
    /// Create a new brief service
    pub fn new(provider: Arc<dyn Provider>, options: BriefOptions) -> Self {
        Self {
            provider,
            options,
            progress: None,
        }
    }

    /// Report batch completion to a callback
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Settings in use
    pub fn options(&self) -> &BriefOptions {
        &self.options
    }

    /// Provider in use
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Generate a brief for raw page texts
    ///
    /// Blank pages are skipped. With no language given, the dominant
    /// language of the document is used. This never fails: pages that could
    /// not be summarized get placeholder content and `brief.error` says so.
    pub async fn generate<S: AsRef<str>>(&self, raw_pages: &[S], language: Option<Language>) -> BriefOutcome {
        let pages = PageText::from_raw_pages(raw_pages);
        let language = language.unwrap_or_else(|| {
            let detected = detect_document_language(raw_pages);
            info!("Detected document language: {}", detected);
            detected
        });

        if pages.is_empty() {
            warn!("No readable pages in {} input pages", raw_pages.len());
            return BriefOutcome {
                brief: BriefResult::from_summaries(Vec::new(), Some(NO_READABLE_PAGES.to_string())),
                usage: UsageLedger::new(),
                batches: Vec::new(),
                language,
            };
        }

        let batches = self.options.planner.plan(&pages);
        let total = batches.len();
        info!(
            "Generating {} brief for {} pages in {} batches (up to {} in parallel)",
            language,
            pages.len(),
            total,
            self.options.max_parallel_batches
        );

        let completed = AtomicUsize::new(0);
        let mut outcomes = Vec::with_capacity(total);
        let mut group_start = 0;

        for group in parallel_groups(&batches, self.options.max_parallel_batches) {
            let tasks = group.iter().enumerate().map(|(offset, batch)| {
                let completed = &completed;
                let index = group_start + offset;
                async move {
                    let outcome = self.process_batch(index, batch, language).await;
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(progress) = &self.progress {
                        progress(done, total);
                    }
                    outcome
                }
            });

            outcomes.extend(join_all(tasks).await);
            group_start += group.len();
        }

        self.merge(outcomes, language)
    }

    fn merge(&self, outcomes: Vec<BatchOutcome>, language: Language) -> BriefOutcome {
        let mut summaries = Vec::new();
        let mut reports = Vec::with_capacity(outcomes.len());
        let mut usage = UsageLedger::new();

        for outcome in outcomes {
            summaries.extend(outcome.summaries);
            usage.merge(&outcome.usage);
            reports.push(outcome.report);
        }

        let failed: Vec<&BatchReport> = reports.iter().filter(|r| r.used_fallback).collect();
        let error = if failed.is_empty() {
            None
        } else {
            let details = failed
                .iter()
                .map(|r| format!("batch {}: {}", r.index + 1, r.last_error.as_deref().unwrap_or("unknown error")))
                .collect::<Vec<_>>()
                .join("; ");
            Some(format!(
                "{} of {} batches used placeholder content ({})",
                failed.len(),
                reports.len(),
                details
            ))
        };

        let brief = BriefResult::from_summaries(summaries, error);
        info!(
            "Brief complete: {} pages, {} fallback batches, {} requests",
            brief.page_summaries.len(),
            failed.len(),
            usage.requests
        );

        BriefOutcome {
            brief,
            usage,
            batches: reports,
            language,
        }
    }

    async fn process_batch(&self, index: usize, batch: &Batch, language: Language) -> BatchOutcome {
        let prompt = BriefPromptBuilder::new(language)
            .with_word_band(self.options.min_words, self.options.target_words)
            .build(batch);
        let max_attempts = self.options.max_retry_attempts.max(1);
        let mut usage = UsageLedger::new();
        let mut last_error = None;

        info!(
            "Batch {} started: pages {}-{}",
            index + 1,
            batch.page_number(0),
            batch.page_number(batch.len().saturating_sub(1))
        );

        for attempt in 1..=max_attempts {
            let is_last = attempt == max_attempts;
            match self.attempt(&prompt, batch, language, attempt, is_last, &mut usage).await {
                Ok((summaries, language_report)) => {
                    info!("Batch {} finished after {} attempt(s)", index + 1, attempt);
                    return BatchOutcome {
                        summaries,
                        report: BatchReport {
                            index,
                            page_count: batch.len(),
                            attempts: attempt,
                            used_fallback: false,
                            replaced_pages: language_report.replaced_pages,
                            last_error,
                        },
                        usage,
                    };
                }
                Err(e) => {
                    warn!("Batch {} attempt {}/{} failed: {}", index + 1, attempt, max_attempts, e);
                    last_error = Some(e.to_string());
                    if !is_last && !self.options.retry_delay.is_zero() {
                        tokio::time::sleep(self.options.retry_delay).await;
                    }
                }
            }
        }

        warn!("Batch {} falls back to placeholder content", index + 1);
        BatchOutcome {
            summaries: self.fallback(batch, language),
            report: BatchReport {
                index,
                page_count: batch.len(),
                attempts: max_attempts,
                used_fallback: true,
                replaced_pages: Vec::new(),
                last_error,
            },
            usage,
        }
    }

    /// One attempt: call, repair, validate, enforce language
    async fn attempt(
        &self,
        prompt: &str,
        batch: &Batch,
        language: Language,
        attempt: u32,
        is_last: bool,
        usage: &mut UsageLedger,
    ) -> Result<(Vec<PageSummary>, LanguageReport), BriefError> {
        let request = GenerationRequest::new(
            prompt,
            retry_temperature(self.options.temperature, attempt),
            self.options.max_output_tokens,
        );

        let started = Instant::now();
        let generation = match self.provider.generate(request).await {
            Ok(generation) => generation,
            Err(e) => {
                usage.record_failure(started.elapsed());
                return Err(e.into());
            }
        };
        usage.record(&generation.usage);
        debug!("Raw response: {}", excerpt(&generation.text, 300));

        let mut summaries = parse_and_validate(&generation.text, batch)?;
        let report = self.options.guard.enforce(&mut summaries, language);

        if report.all_failed && !is_last {
            return Err(BriefError::LanguageMismatch {
                expected: language.to_string(),
                pages: summaries.len(),
            });
        }

        Ok((summaries, report))
    }

    fn fallback(&self, batch: &Batch, language: Language) -> Vec<PageSummary> {
        (0..batch.len())
            .map(|local| {
                placeholder_page(
                    language,
                    batch.page_number(local),
                    self.options.min_words,
                    self.options.target_words,
                )
            })
            .collect()
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
