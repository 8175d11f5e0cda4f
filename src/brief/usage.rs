/*!
 * Token usage accounting.
 *
 * Each provider call returns its own `TokenUsage`. Batches fold those into
 * a `UsageLedger`, and the service merges the batch ledgers into one total
 * for the document. Nothing is tracked globally.
 */

use serde::Serialize;
use std::time::Duration;

use crate::providers::TokenUsage;

/// Accumulated usage for a batch or a whole document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageLedger {
    /// Provider calls made
    pub requests: u64,
    /// Provider calls that returned an error
    pub failed_requests: u64,
    /// Prompt tokens reported
    pub prompt_tokens: u64,
    /// Completion tokens reported
    pub completion_tokens: u64,
    /// Time spent waiting on the provider
    pub api_duration: Duration,
}

impl UsageLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful call
    pub fn record(&mut self, usage: &TokenUsage) {
        self.requests += 1;
        self.prompt_tokens += usage.prompt_tokens.unwrap_or(0);
        self.completion_tokens += usage.completion_tokens.unwrap_or(0);
        self.api_duration += usage.duration;
    }

    /// Record a failed call
    pub fn record_failure(&mut self, duration: Duration) {
        self.requests += 1;
        self.failed_requests += 1;
        self.api_duration += duration;
    }

    /// Add another ledger into this one
    pub fn merge(&mut self, other: &UsageLedger) {
        self.requests += other.requests;
        self.failed_requests += other.failed_requests;
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.api_duration += other.api_duration;
    }

    /// Prompt plus completion tokens
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Estimated cost from per-million-token prices
    pub fn estimated_cost(&self, input_price_per_million: f64, output_price_per_million: f64) -> f64 {
        (self.prompt_tokens as f64 * input_price_per_million
            + self.completion_tokens as f64 * output_price_per_million)
            / 1_000_000.0
    }

    /// Human readable summary
    pub fn summary(&self) -> String {
        format!(
            "Token Usage Summary:\n\
             Requests: {} ({} failed)\n\
             Prompt tokens: {}\n\
             Completion tokens: {}\n\
             Total tokens: {}\n\
             API request time: {:.2} seconds",
            self.requests,
            self.failed_requests,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens(),
            self.api_duration.as_secs_f64()
        )
    }
}

impl std::iter::Sum for UsageLedger {
    fn sum<I: Iterator<Item = UsageLedger>>(iter: I) -> Self {
        iter.fold(UsageLedger::new(), |mut total, ledger| {
            total.merge(&ledger);
            total
        })
    }
}
