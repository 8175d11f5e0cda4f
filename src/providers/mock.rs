/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always answers with a well-formed brief
 * - `MockProvider::scripted()` - Plays back a fixed list of replies
 * - `MockProvider::failing()` - Always fails with an error
 *
 * Every mock records the requests it receives and the peak number of
 * concurrent calls, so tests can assert on retries and parallelism.
 */

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::language_utils::Language;
use crate::providers::{Generation, GenerationRequest, Provider, TokenUsage};

static PAGE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"=== PAGE (\d+) ===").expect("page marker pattern is valid")
});

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this raw text
    Text(String),
    /// Return a well-formed brief for the pages in the prompt
    Valid(Language),
    /// Fail the call
    Fail,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always succeeds with a well-formed brief
    Working(Language),
    /// Replies in order; the last reply repeats once the script is exhausted
    Scripted(Vec<MockReply>),
    /// Always fails with an error
    Failing,
}

type Responder = Arc<dyn Fn(&GenerationRequest, usize) -> Result<String, ProviderError> + Send + Sync>;

/// Mock provider for testing brief generation
#[derive(Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Custom response generator, takes precedence over the behavior
    responder: Option<Responder>,
    /// Simulated latency per call
    delay: Duration,
    /// Calls made so far
    request_count: Arc<AtomicUsize>,
    /// `test_connection` calls made so far
    connection_checks: Arc<AtomicUsize>,
    /// Calls currently running
    in_flight: Arc<AtomicUsize>,
    /// Highest value `in_flight` reached
    max_in_flight: Arc<AtomicUsize>,
    /// Requests received, in arrival order
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("behavior", &self.behavior)
            .field("delay", &self.delay)
            .field("request_count", &self.request_count())
            .finish()
    }
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            responder: None,
            delay: Duration::ZERO,
            request_count: Arc::new(AtomicUsize::new(0)),
            connection_checks: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that answers in English
    pub fn working() -> Self {
        Self::new(MockBehavior::Working(Language::English))
    }

    /// Create a working mock provider that answers in the given language
    pub fn working_in(language: Language) -> Self {
        Self::new(MockBehavior::Working(language))
    }

    /// Create a mock that plays back the given replies
    pub fn scripted(replies: Vec<MockReply>) -> Self {
        Self::new(MockBehavior::Scripted(replies))
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Set a custom response generator
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&GenerationRequest, usize) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        self.responder = Some(Arc::new(responder));
        self
    }

    /// Add simulated latency to every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of calls received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Number of connection checks received
    pub fn connection_check_count(&self) -> usize {
        self.connection_checks.load(Ordering::SeqCst)
    }

    /// Peak number of overlapping calls
    pub fn max_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Copy of every request received
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Page numbers announced in a prompt
    pub fn page_numbers_in(prompt: &str) -> Vec<u32> {
        PAGE_MARKER
            .captures_iter(prompt)
            .filter_map(|c| c[1].parse().ok())
            .collect()
    }

    /// Generate a well-formed brief response for the pages of a prompt
    pub fn generate_brief_response(prompt: &str, language: Language) -> String {
        let summaries: Vec<serde_json::Value> = Self::page_numbers_in(prompt)
            .into_iter()
            .map(|n| {
                let (title, summary) = match language {
                    Language::English => (
                        format!("Lecture Notes {}", n),
                        format!(
                            "## Overview\n\nPage {} introduces the central ideas of the lecture.\n\n- Key definitions\n- Worked examples\n- Connections to earlier material",
                            n
                        ),
                    ),
                    Language::Georgian => (
                        format!("ლექციის ჩანაწერები {}", n),
                        format!(
                            "## მიმოხილვა\n\nგვერდი {} წარმოადგენს ლექციის ძირითად იდეებს.\n\n- მთავარი განმარტებები\n- ამოხსნილი მაგალითები\n- კავშირი წინა მასალასთან",
                            n
                        ),
                    ),
                };
                serde_json::json!({ "pageNumber": n, "title": title, "summary": summary })
            })
            .collect();

        serde_json::json!({ "pageSummaries": summaries }).to_string()
    }

    fn reply_for(&self, request: &GenerationRequest, call_index: usize) -> Result<String, ProviderError> {
        if let Some(responder) = &self.responder {
            return responder(request, call_index);
        }

        let reply = match &self.behavior {
            MockBehavior::Working(language) => MockReply::Valid(*language),
            MockBehavior::Failing => MockReply::Fail,
            MockBehavior::Scripted(replies) => replies
                .get(call_index)
                .or_else(|| replies.last())
                .cloned()
                .unwrap_or(MockReply::Fail),
        };

        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Valid(language) => Ok(Self::generate_brief_response(&request.prompt, language)),
            MockReply::Fail => Err(ProviderError::ApiError {
                message: format!("Simulated provider failure (request #{})", call_index + 1),
                status_code: 500,
            }),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, ProviderError> {
        let call_index = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = self.reply_for(&request, call_index);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        result.map(|text| Generation {
            usage: TokenUsage {
                prompt_tokens: Some(request.prompt.len() as u64 / 4),
                completion_tokens: Some(text.len() as u64 / 4),
                duration: self.delay,
            },
            text,
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.connection_checks.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Mock provider is failing".to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
