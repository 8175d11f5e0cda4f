/*!
 * Provider-specific concurrency tuning.
 *
 * Caps how many batches run at once for each backend, to stay below
 * provider-side rate limits.
 */

use crate::app_config::LlmProvider;

/// Concurrency profile for a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Batches launched together in one parallel group
    pub max_parallel_batches: usize,
}

impl Default for ProviderProfile {
    fn default() -> Self {
        Self { max_parallel_batches: 3 }
    }
}

impl ProviderProfile {
    /// Get the profile for a configured provider
    pub fn for_provider(provider: LlmProvider) -> Self {
        match provider {
            LlmProvider::Gemini => Self { max_parallel_batches: 3 },
            LlmProvider::Anthropic => Self { max_parallel_batches: 3 },
            // Local server, one model instance
            LlmProvider::Ollama => Self { max_parallel_batches: 2 },
        }
    }

    /// Effective group size, respecting any user override
    pub fn effective_parallel_batches(&self, user_override: Option<usize>) -> usize {
        user_override.unwrap_or(self.max_parallel_batches).max(1)
    }
}
