/*!
 * Batch planning.
 *
 * Splits the readable pages of a document into contiguous batches, one
 * provider request each, and groups batches for bounded parallel execution.
 */

use log::debug;

use crate::app_config::BriefConfig;
use super::document::{Batch, PageText};

/// Partitions pages into request-sized batches
#[derive(Debug, Clone)]
pub struct BatchPlanner {
    /// Page count at or below which a single batch is used
    pub small_document_threshold: usize,
    /// Page count per batch on the multi-batch path
    pub pages_per_batch: usize,
    /// Character budget per batch on the multi-batch path
    pub max_chars_per_batch: usize,
}

impl Default for BatchPlanner {
    fn default() -> Self {
        Self::from_config(&BriefConfig::default())
    }
}

impl BatchPlanner {
    /// Create a planner from brief settings
    pub fn from_config(config: &BriefConfig) -> Self {
        Self {
            small_document_threshold: config.small_document_threshold,
            pages_per_batch: config.pages_per_batch.max(1),
            max_chars_per_batch: config.max_chars_per_batch,
        }
    }

    /// Plan batches for already filtered pages
    pub fn plan(&self, pages: &[PageText]) -> Vec<Batch> {
        if pages.is_empty() {
            return Vec::new();
        }

        if pages.len() <= self.small_document_threshold {
            debug!("{} pages fit in a single batch", pages.len());
            return vec![Batch::new(0, pages.to_vec())];
        }

        let mut batches = Vec::new();
        let mut current: Vec<PageText> = Vec::new();
        let mut current_chars = 0;
        let mut start_index = 0;

        for (offset, page) in pages.iter().enumerate() {
            let page_chars = page.char_count();
            let over_budget = self.max_chars_per_batch > 0
                && current_chars + page_chars > self.max_chars_per_batch;

            if !current.is_empty() && (current.len() >= self.pages_per_batch || over_budget) {
                batches.push(Batch::new(start_index, std::mem::take(&mut current)));
                current_chars = 0;
                start_index = offset;
            }

            current_chars += page_chars;
            current.push(page.clone());
        }

        if !current.is_empty() {
            batches.push(Batch::new(start_index, current));
        }

        debug!("Planned {} batches for {} pages", batches.len(), pages.len());
        for batch in &batches {
            debug!(
                "Batch at page {}: {} pages, {} chars",
                batch.page_number(0),
                batch.len(),
                batch.char_count()
            );
        }
        batches
    }
}

/// Split batches into groups that run together
pub fn parallel_groups(batches: &[Batch], max_parallel: usize) -> std::slice::Chunks<'_, Batch> {
    batches.chunks(max_parallel.max(1))
}
