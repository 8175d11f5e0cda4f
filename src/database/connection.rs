/*!
 * SQLite connection handling for the brief store.
 *
 * One connection is shared behind a mutex. Async callers hand their work
 * to `spawn_blocking` so SQLite I/O never runs on a runtime worker.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::schema;

const STORE_FILE_NAME: &str = "briefs.db";
const STORE_DIR_NAME: &str = "briefgen";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the store lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A database file
    File(PathBuf),
    /// A private in-memory database
    Memory,
}

/// Shared handle to the brief store
#[derive(Clone)]
pub struct DatabaseConnection {
    location: Location,
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open the store in the user's data directory
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_database_path()?)
    }

    /// Open (or create) the store at `db_path`
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(dir) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).with_context(|| format!("Failed to create store directory {:?}", dir))?;
        }

        info!("Brief store: {}", db_path.display());
        let conn = Connection::open(&db_path).with_context(|| format!("Failed to open brief store {:?}", db_path))?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        Self::prepare(conn, Location::File(db_path))
    }

    /// Open a throwaway in-memory store
    pub fn new_in_memory() -> Result<Self> {
        debug!("Opening in-memory brief store");
        let conn = Connection::open_in_memory().context("Failed to open in-memory brief store")?;
        Self::prepare(conn, Location::Memory)
    }

    fn prepare(conn: Connection, location: Location) -> Result<Self> {
        schema::initialize_schema(&conn)?;
        Ok(Self {
            location,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data dir>/briefgen/briefs.db`
    pub fn default_database_path() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .ok_or_else(|| anyhow!("Could not determine a data directory for the brief store"))?;

        Ok(data_dir.join(STORE_DIR_NAME).join(STORE_FILE_NAME))
    }

    /// Where the store lives
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Database file, if the store is file-backed
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    fn lock(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
        connection
            .lock()
            .map_err(|e| anyhow!("Brief store lock poisoned: {}", e))
    }

    /// Run `f` on the calling thread
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        f(&*Self::lock(&self.connection)?)
    }

    async fn run_blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || f(&mut *Self::lock(&connection)?))
            .await
            .context("Brief store task panicked")?
    }

    /// Run `f` on the blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |conn| f(conn)).await
    }

    /// Run `f` in a transaction on the blocking pool; commits only when `f` succeeds
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |conn| {
            let tx = conn.transaction()?;
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
        .await
    }

    /// Row counts and file size
    pub fn stats(&self) -> Result<DatabaseStats> {
        let (brief_count, page_count) = self.execute(|conn| {
            let count = |table: &str| -> rusqlite::Result<i64> {
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            };
            Ok((count("briefs")?, count("page_summaries")?))
        })?;

        let file_size_bytes = self
            .path()
            .and_then(|path| std::fs::metadata(path).ok())
            .map_or(0, |meta| meta.len());

        Ok(DatabaseStats {
            brief_count,
            page_count,
            file_size_bytes,
        })
    }
}

/// Size of the brief store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    pub brief_count: i64,
    pub page_count: i64,
    pub file_size_bytes: u64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} briefs, {} page summaries, {} KB on disk",
            self.brief_count,
            self.page_count,
            self.file_size_bytes / 1024
        )
    }
}
