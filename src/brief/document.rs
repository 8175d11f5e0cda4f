/*!
 * Document model for brief generation.
 *
 * Pages come in as plain text from an external parser. Blank pages are
 * dropped up front; the surviving pages are numbered 1..=n in reading order
 * and that number is the `pageNumber` of the matching summary.
 */

use serde::{Deserialize, Serialize};

/// One page or slide of extracted text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based position among readable pages
    pub index: usize,
    /// 1-based position in the raw input, blank pages included
    pub source_index: usize,
    /// Extracted text
    pub content: String,
}

impl PageText {
    /// Create a page
    pub fn new(index: usize, source_index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            source_index,
            content: content.into(),
        }
    }

    /// Build readable pages from raw parser output, skipping blank entries
    pub fn from_raw_pages<S: AsRef<str>>(raw_pages: &[S]) -> Vec<PageText> {
        raw_pages
            .iter()
            .enumerate()
            .filter(|(_, content)| !content.as_ref().trim().is_empty())
            .enumerate()
            .map(|(index, (source, content))| PageText::new(index + 1, source + 1, content.as_ref()))
            .collect()
    }

    /// Characters in the page
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// A contiguous slice of pages sent in one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 0-based offset of the first page among readable pages
    pub start_index: usize,
    /// Pages in order
    pub pages: Vec<PageText>,
}

impl Batch {
    /// Create a batch
    pub fn new(start_index: usize, pages: Vec<PageText>) -> Self {
        Self { start_index, pages }
    }

    /// Number of pages
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the batch holds no pages
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Absolute page number of the page at `local_index`
    pub fn page_number(&self, local_index: usize) -> usize {
        self.start_index + local_index + 1
    }

    /// Characters across all pages
    pub fn char_count(&self) -> usize {
        self.pages.iter().map(PageText::char_count).sum()
    }
}

/// AI-generated summary of one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    /// Page number, matching `PageText::index`
    pub page_number: usize,
    /// Short title
    pub title: String,
    /// Markdown summary
    pub summary: String,
}

/// Complete brief for a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefResult {
    /// Page summaries, ascending by page number
    pub page_summaries: Vec<PageSummary>,
    /// Informational message when degraded content was returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BriefResult {
    /// Build a brief, sorting the summaries by page number
    pub fn from_summaries(mut page_summaries: Vec<PageSummary>, error: Option<String>) -> Self {
        page_summaries.sort_by_key(|s| s.page_number);
        Self { page_summaries, error }
    }

    /// Whether page numbers run 1..=n without gaps or duplicates
    pub fn is_contiguous(&self) -> bool {
        self.page_summaries
            .iter()
            .enumerate()
            .all(|(i, s)| s.page_number == i + 1)
    }
}
