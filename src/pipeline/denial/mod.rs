pub mod codes;
pub mod codebook;
pub mod planner;

pub use codes::*;
pub use codebook::*;
pub use planner::*;

use thiserror::Error;

use crate::pipeline::llm::{LlmError, ReplyError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DenialError {
    #[error("Model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Model response does not match the denial plan shape: {0}")]
    Shape(String),

    #[error("Codebook parsing error: {0}")]
    Codebook(String),

    #[error("Denial text is empty")]
    InputEmpty,
}

impl From<ReplyError> for DenialError {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::Malformed(msg) => DenialError::MalformedResponse(msg),
            ReplyError::Json(msg) => DenialError::JsonParsing(msg),
            ReplyError::Shape(msg) => DenialError::Shape(msg),
        }
    }
}
