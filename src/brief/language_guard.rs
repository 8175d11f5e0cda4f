/*!
 * Output language enforcement.
 *
 * Every title and summary is checked with the script detector. A page
 * whose title or summary does not conform to the expected language gets
 * both fields replaced with placeholder content, so the final brief is
 * always monolingual.
 */

use log::{debug, warn};

use crate::app_config::BriefConfig;
use crate::language_utils::{detect_language, Language};
use super::document::PageSummary;
use super::placeholders::placeholder_page;

/// Outcome of enforcing the language on one set of summaries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageReport {
    /// Page numbers whose content was replaced
    pub replaced_pages: Vec<usize>,
    /// Whether every page was replaced
    pub all_failed: bool,
}

/// Checks and corrects the language of generated summaries
#[derive(Debug, Clone)]
pub struct LanguageGuard {
    /// Minimum share of the expected script
    pub min_confidence: f64,
    /// Maximum share of the other script
    pub mixing_tolerance: f64,
    /// Word band mentioned in placeholder summaries
    pub min_words: usize,
    pub target_words: usize,
}

impl Default for LanguageGuard {
    fn default() -> Self {
        Self::from_config(&BriefConfig::default())
    }
}

impl LanguageGuard {
    pub fn from_config(config: &BriefConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            mixing_tolerance: config.mixing_tolerance,
            min_words: config.min_words,
            target_words: config.target_words,
        }
    }

    /// Whether a single field is written in the expected language
    pub fn is_conforming(&self, text: &str, expected: Language) -> bool {
        let analysis = detect_language(text);
        analysis.language == expected
            && analysis.confidence >= self.min_confidence
            && analysis.minority_ratio() <= self.mixing_tolerance
    }

    /// Replace every non-conforming page in place
    pub fn enforce(&self, summaries: &mut [PageSummary], expected: Language) -> LanguageReport {
        let mut replaced_pages = Vec::new();

        for entry in summaries.iter_mut() {
            if self.is_conforming(&entry.title, expected) && self.is_conforming(&entry.summary, expected) {
                continue;
            }

            debug!(
                "Page {} off-language, title: {:?}, summary: {:?}",
                entry.page_number,
                detect_language(&entry.title),
                detect_language(&entry.summary)
            );
            *entry = placeholder_page(expected, entry.page_number, self.min_words, self.target_words);
            replaced_pages.push(entry.page_number);
        }

        if !replaced_pages.is_empty() {
            warn!(
                "Replaced {} of {} pages not written in {}: {:?}",
                replaced_pages.len(),
                summaries.len(),
                expected,
                replaced_pages
            );
        }

        LanguageReport {
            all_failed: !summaries.is_empty() && replaced_pages.len() == summaries.len(),
            replaced_pages,
        }
    }
}
