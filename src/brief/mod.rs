/*!
 * Lecture brief generation.
 *
 * This module turns the page texts of a document into per-page study
 * summaries:
 * - `document`: pages, batches and the brief data model
 * - `batch`: batch planning and parallel groups
 * - `prompts`: prompt construction
 * - `response`: JSON repair and shape validation of model output
 * - `language_guard` / `placeholders`: output language enforcement
 * - `orchestrator`: retries, fallback and merging
 * - `usage`: token accounting
 */

pub mod batch;
pub mod concurrency;
pub mod document;
pub mod language_guard;
pub mod orchestrator;
pub mod placeholders;
pub mod prompts;
pub mod response;
pub mod usage;

pub use batch::BatchPlanner;
pub use concurrency::ProviderProfile;
pub use document::{Batch, BriefResult, PageSummary, PageText};
pub use language_guard::{LanguageGuard, LanguageReport};
pub use orchestrator::{BatchReport, BriefOptions, BriefOutcome, BriefService};
pub use usage::UsageLedger;
