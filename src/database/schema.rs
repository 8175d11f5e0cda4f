/*!
 * Brief store schema.
 *
 * The schema is a list of numbered migrations. A fresh database runs all of
 * them; an existing one runs those above the version recorded in
 * `schema_version`.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension};

/// Version after all migrations have run
pub const SCHEMA_VERSION: i32 = 1;

const CREATE_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

const V1_BRIEFS: &str = r#"
CREATE TABLE briefs (
    id TEXT PRIMARY KEY,
    document_hash TEXT NOT NULL,
    source_name TEXT NOT NULL,
    language TEXT NOT NULL,
    provider TEXT NOT NULL,
    model TEXT NOT NULL,
    page_count INTEGER NOT NULL,
    error TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX idx_briefs_document ON briefs(document_hash, language);
CREATE INDEX idx_briefs_created ON briefs(created_at);

CREATE TABLE page_summaries (
    brief_id TEXT NOT NULL REFERENCES briefs(id) ON DELETE CASCADE,
    page_number INTEGER NOT NULL,
    title TEXT NOT NULL,
    summary TEXT NOT NULL,
    PRIMARY KEY (brief_id, page_number)
);
"#;

/// `(version, sql)` in ascending order
const MIGRATIONS: &[(i32, &str)] = &[(1, V1_BRIEFS)];

/// Bring a connection's schema up to `SCHEMA_VERSION`
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    // Per connection, not persisted in the file
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.execute_batch(CREATE_VERSION_TABLE)?;

    let current = schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(anyhow!(
            "Brief store uses schema v{}, newer than the supported v{}",
            current,
            SCHEMA_VERSION
        ));
    }
    if current == SCHEMA_VERSION {
        debug!("Brief store schema is current (v{})", current);
        return Ok(());
    }

    for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        info!("Applying brief store migration v{}", version);
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)
            .with_context(|| format!("Migration v{} failed", version))?;
        record_version(&tx, *version)?;
        tx.commit()?;
    }

    Ok(())
}

/// Recorded version, 0 for a fresh database
fn schema_version(conn: &Connection) -> Result<i32> {
    let version = conn
        .query_row("SELECT version FROM schema_version WHERE id = 1", [], |row| row.get(0))
        .optional()
        .context("Failed to read schema version")?;
    Ok(version.unwrap_or(0))
}

fn record_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))
         ON CONFLICT(id) DO UPDATE SET version = excluded.version, updated_at = excluded.updated_at",
        [version],
    )?;
    Ok(())
}
