/*!
 * # briefgen - Lecture briefs with AI
 *
 * A Rust library that turns the extracted text of lecture slides or
 * document pages into per-page study summaries using an LLM.
 *
 * ## Features
 *
 * - Summarize documents with various AI providers:
 *   - Google Gemini API
 *   - Anthropic API
 *   - Ollama (local LLM)
 * - Georgian and English output with script-level language enforcement
 * - Parallel batch processing with retries and placeholder fallback
 * - Repair of malformed JSON model output
 * - SQLite store for generated briefs
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `brief`: The generation pipeline:
 *   - `brief::batch`: Batch planning
 *   - `brief::prompts`: Prompt construction
 *   - `brief::response`: Parsing and repair of model output
 *   - `brief::language_guard`: Output language enforcement
 *   - `brief::orchestrator`: Retries, fallback and merging
 * - `providers`: Client implementations for the LLM providers
 * - `database`: Brief persistence
 * - `file_utils`: Page input loading and file system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Language codes and script detection
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod brief;
pub mod database;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;

// Re-export main types for easier usage
pub use app_config::Config;
pub use brief::{BriefOptions, BriefOutcome, BriefResult, BriefService, PageSummary};
pub use errors::{AppError, BriefError, ProviderError, ResponseError};
pub use language_utils::{detect_language, Language};
