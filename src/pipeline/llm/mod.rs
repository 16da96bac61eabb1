//! Extraction-service boundary: the LLM that answers free-form clinical
//! questions about a record.
//!
//! The adjudication core only sees `LlmClient::generate`. Transport faults are
//! absorbed by `RetryingLlmClient`; anything that escapes it is fatal for the
//! claim under review.

pub mod ollama;
pub mod retry;

pub use ollama::{MockLlmClient, OllamaClient};
pub use retry::{RetryPolicy, RetryingLlmClient};

use thiserror::Error;

/// System prompt used when the caller does not supply one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Ollama is not running at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Ollama returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Model not available: {0}")]
    ModelUnavailable(String),
}

impl LlmError {
    /// Transient faults worth another attempt. Parse failures and missing
    /// models never resolve themselves.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) | Self::HttpClient(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::ResponseParsing(_) | Self::ModelUnavailable(_) => false,
        }
    }
}

/// Text-generation client abstraction (allows mocking).
pub trait LlmClient {
    /// Single-shot completion. `system` falls back to
    /// [`DEFAULT_SYSTEM_PROMPT`] when `None`.
    fn generate(&self, model: &str, prompt: &str, system: Option<&str>) -> Result<String, LlmError>;

    fn is_model_available(&self, model: &str) -> Result<bool, LlmError>;
}

impl<T: LlmClient + ?Sized> LlmClient for Box<T> {
    fn generate(&self, model: &str, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        (**self).generate(model, prompt, system)
    }

    fn is_model_available(&self, model: &str) -> Result<bool, LlmError> {
        (**self).is_model_available(model)
    }
}
