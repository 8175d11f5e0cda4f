/*!
 * Database entity models.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::brief::{BriefResult, PageSummary};

/// Stored brief metadata, one row of `briefs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefRecord {
    /// Unique brief identifier (UUID)
    pub id: String,
    /// SHA256 hash of the page texts
    pub document_hash: String,
    /// File or document name the pages came from
    pub source_name: String,
    /// Output language code
    pub language: String,
    /// Provider used
    pub provider: String,
    /// Model used
    pub model: String,
    /// Number of summarized pages
    pub page_count: i64,
    /// Informational error carried by the brief
    pub error: Option<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl BriefRecord {
    /// Create a record for a freshly generated brief
    pub fn new(
        document_hash: String,
        source_name: String,
        language: String,
        provider: String,
        model: String,
        brief: &BriefResult,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            document_hash,
            source_name,
            language,
            provider,
            model,
            page_count: brief.page_summaries.len() as i64,
            error: brief.error.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Whether the brief was stored with degraded content
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

impl fmt::Display for BriefRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  {} pages  {}  {}/{}  {}",
            self.id,
            self.source_name,
            self.page_count,
            self.language,
            self.provider,
            self.model,
            self.created_at
        )?;
        if self.is_degraded() {
            write!(f, "  (degraded)")?;
        }
        Ok(())
    }
}

/// A brief with its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBrief {
    /// Metadata row
    pub record: BriefRecord,
    /// Page summaries, ascending by page number
    pub page_summaries: Vec<PageSummary>,
}

impl StoredBrief {
    /// Rebuild the brief in its wire form
    pub fn to_brief(&self) -> BriefResult {
        BriefResult::from_summaries(self.page_summaries.clone(), self.record.error.clone())
    }
}
