//! Remit LLM Provider Layer
//!
//! Pluggable LLM provider implementations behind the `LlmProvider` seam from
//! `remit-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: deterministic mock for testing and `--mock` runs
//! - `AnthropicProvider`: Anthropic Messages API over HTTP
//!
//! # Examples
//!
//! ```
//! use remit_llm::MockProvider;
//! use remit_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("{}");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "{}");
//! ```

#![warn(missing_docs)]

pub mod anthropic;

use remit_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use anthropic::AnthropicProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the model
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider misconfiguration (missing key, bad endpoint)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Mock LLM provider for deterministic testing.
///
/// Returns pre-configured responses without any network calls. Responses can
/// be keyed by exact prompt, queued in order (useful for scripting a
/// draft-then-informed two-pass extraction), or left at a fixed default.
///
/// # Examples
///
/// ```
/// use remit_llm::MockProvider;
/// use remit_domain::traits::LlmProvider;
///
/// let provider = MockProvider::new("fixed");
/// assert_eq!(provider.generate("any prompt").unwrap(), "fixed");
///
/// // Queued responses are served first, in order
/// let provider = MockProvider::new("fallback");
/// provider.push_response("first call");
/// provider.push_response("second call");
/// assert_eq!(provider.generate("a").unwrap(), "first call");
/// assert_eq!(provider.generate("b").unwrap(), "second call");
/// assert_eq!(provider.generate("c").unwrap(), "fallback");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    queued: Arc<Mutex<VecDeque<String>>>,
    call_count: Arc<Mutex<usize>>,
    failure: Option<String>,
}

impl MockProvider {
    /// Create a provider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            queued: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            failure: None,
        }
    }

    /// Create a provider that fails every call with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        let mut provider = Self::new("");
        provider.failure = Some(message.into());
        provider
    }

    /// Add a specific response for an exact prompt
    pub fn add_response(&self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), response.into());
    }

    /// Queue a response to be served on the next call, ahead of prompt
    /// matching and the default
    pub fn push_response(&self, response: impl Into<String>) {
        self.queued.lock().unwrap().push_back(response.into());
    }

    /// Number of times `generate` was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;

        if let Some(message) = &self.failure {
            return Err(LlmError::Other(message.clone()));
        }

        if let Some(response) = self.queued.lock().unwrap().pop_front() {
            return Ok(response);
        }

        let responses = self.responses.lock().unwrap();
        if let Some(response) = responses.get(prompt) {
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }
}
