/*!
 * Database module for persistent storage of briefs.
 *
 * This module provides SQLite-based persistence for generated briefs,
 * so a document that was already summarized in a language can be
 * served again without new provider calls.
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats, Location};
pub use models::{BriefRecord, StoredBrief};
pub use repository::Repository;
