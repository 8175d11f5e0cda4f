/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for storing and retrieving briefs,
 * abstracting away the SQL details and providing type-safe access.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::brief::PageSummary;
use super::connection::DatabaseConnection;
use super::models::{BriefRecord, StoredBrief};

const BRIEF_COLUMNS: &str =
    "id, document_hash, source_name, language, provider, model, page_count, error, created_at";

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// SHA256 over the page texts, with a separator between pages
    pub fn hash_document<S: AsRef<str>>(pages: &[S]) -> String {
        let mut hasher = Sha256::new();
        for page in pages {
            hasher.update(page.as_ref().as_bytes());
            hasher.update([0x0C]);
        }
        format!("{:x}", hasher.finalize())
    }

    fn parse_brief_row(row: &rusqlite::Row) -> rusqlite::Result<BriefRecord> {
        Ok(BriefRecord {
            id: row.get(0)?,
            document_hash: row.get(1)?,
            source_name: row.get(2)?,
            language: row.get(3)?,
            provider: row.get(4)?,
            model: row.get(5)?,
            page_count: row.get(6)?,
            error: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn get_summaries_sync(conn: &Connection, brief_id: &str) -> Result<Vec<PageSummary>> {
        let mut stmt = conn.prepare(
            "SELECT page_number, title, summary FROM page_summaries WHERE brief_id = ?1 ORDER BY page_number",
        )?;
        let summaries = stmt
            .query_map([brief_id], |row| {
                Ok(PageSummary {
                    page_number: row.get::<_, i64>(0)? as usize,
                    title: row.get(1)?,
                    summary: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(summaries)
    }

    fn get_brief_sync(conn: &Connection, brief_id: &str) -> Result<Option<StoredBrief>> {
        let record = conn
            .query_row(
                &format!("SELECT {} FROM briefs WHERE id = ?1", BRIEF_COLUMNS),
                [brief_id],
                Self::parse_brief_row,
            )
            .optional()?;

        match record {
            Some(record) => {
                let page_summaries = Self::get_summaries_sync(conn, &record.id)?;
                Ok(Some(StoredBrief { record, page_summaries }))
            }
            None => Ok(None),
        }
    }

    /// Store a brief and its page summaries
    pub async fn save_brief(&self, record: &BriefRecord, summaries: &[PageSummary]) -> Result<()> {
        let record = record.clone();
        let summaries = summaries.to_vec();
        debug!("Saving brief {} with {} pages", record.id, summaries.len());

        self.db
            .transaction_async(move |tx| {
                tx.execute(
                    &format!(
                        "INSERT INTO briefs ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                        BRIEF_COLUMNS
                    ),
                    params![
                        record.id,
                        record.document_hash,
                        record.source_name,
                        record.language,
                        record.provider,
                        record.model,
                        record.page_count,
                        record.error,
                        record.created_at,
                    ],
                )?;

                let mut stmt = tx.prepare(
                    "INSERT INTO page_summaries (brief_id, page_number, title, summary) VALUES (?1, ?2, ?3, ?4)",
                )?;
                for summary in &summaries {
                    stmt.execute(params![
                        record.id,
                        summary.page_number as i64,
                        summary.title,
                        summary.summary,
                    ])?;
                }

                Ok(())
            })
            .await
    }

    /// Get a brief by ID
    pub async fn get_brief(&self, brief_id: &str) -> Result<Option<StoredBrief>> {
        let brief_id = brief_id.to_string();

        self.db
            .execute_async(move |conn| Self::get_brief_sync(conn, &brief_id))
            .await
    }

    /// Most recent brief for the same document and language
    ///
    /// Briefs that carry an error are skipped so degraded output is regenerated.
    pub async fn find_by_document_hash(&self, document_hash: &str, language: &str) -> Result<Option<StoredBrief>> {
        let document_hash = document_hash.to_string();
        let language = language.to_string();

        self.db
            .execute_async(move |conn| {
                let brief_id: Option<String> = conn
                    .query_row(
                        r#"
                        SELECT id FROM briefs
                        WHERE document_hash = ?1 AND language = ?2 AND error IS NULL
                        ORDER BY created_at DESC
                        LIMIT 1
                        "#,
                        [&document_hash, &language],
                        |row| row.get(0),
                    )
                    .optional()?;

                match brief_id {
                    Some(id) => Self::get_brief_sync(conn, &id),
                    None => Ok(None),
                }
            })
            .await
    }

    /// List stored briefs, newest first
    pub async fn list_briefs(&self, limit: Option<usize>) -> Result<Vec<BriefRecord>> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM briefs ORDER BY created_at DESC LIMIT ?1",
                    BRIEF_COLUMNS
                ))?;
                let records = stmt
                    .query_map([limit], Self::parse_brief_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(records)
            })
            .await
    }

    /// Delete a brief and its summaries; returns whether it existed
    pub async fn delete_brief(&self, brief_id: &str) -> Result<bool> {
        let brief_id = brief_id.to_string();

        self.db
            .execute_async(move |conn| {
                // page_summaries rows go with it through ON DELETE CASCADE
                let deleted = conn.execute("DELETE FROM briefs WHERE id = ?1", [&brief_id])?;
                Ok(deleted > 0)
            })
            .await
    }
}
