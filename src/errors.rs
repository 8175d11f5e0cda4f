/*!
 * Error types for the briefgen application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Map a non-success HTTP status and body onto the matching variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::ParseError(error.to_string())
        } else if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors produced while turning raw model output into page summaries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseError {
    /// Nothing in the output could be parsed as JSON, even after repair
    #[error("Response is not valid JSON after {stages} repair stages: {message}")]
    Unparseable {
        /// Number of repair stages that were tried
        stages: usize,
        /// Last parser error
        message: String,
    },

    /// The JSON parsed but does not have the expected structure
    #[error("Response has an invalid shape: {0}")]
    InvalidShape(String),

    /// Fewer summaries were returned than pages were sent
    #[error("Response covers {returned} of {expected} pages")]
    IncompletePages {
        /// Pages in the batch
        expected: usize,
        /// Summaries in the response
        returned: usize,
    },
}

/// Errors raised by a single batch attempt
#[derive(Error, Debug)]
pub enum BriefError {
    /// The provider call failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider answered but the output was unusable
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    /// Every page of the batch came back in the wrong language
    #[error("All {pages} pages were generated outside {expected}")]
    LanguageMismatch {
        /// Expected output language name
        expected: String,
        /// Number of pages in the batch
        pages: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from brief generation
    #[error("Brief error: {0}")]
    Brief(#[from] BriefError),

    /// Invalid configuration or input
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
