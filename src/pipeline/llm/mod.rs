pub mod openai;
pub mod reply;

pub use openai::*;
pub use reply::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("Model endpoint unreachable at {0}")]
    Connection(String),

    #[error("Model request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Model endpoint returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Response envelope parsing error: {0}")]
    ResponseParsing(String),
}

/// Structured-output model capability (allows mocking).
///
/// One blocking request/response round trip. Implementations must not retry:
/// any failure is surfaced to the caller as-is.
pub trait LlmClient {
    /// Send a system and user instruction and return the raw JSON text the
    /// model produced.
    fn complete_json(&self, model: &str, system: &str, user: &str) -> Result<String, LlmError>;
}
