pub mod patterns;
pub mod prompt;
pub mod model;
pub mod reconcile;
pub mod orchestrator;

pub use patterns::*;
pub use prompt::*;
pub use model::*;
pub use reconcile::*;
pub use orchestrator::*;

use thiserror::Error;

use crate::pipeline::llm::{LlmError, ReplyError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Model response does not match the claim packet shape: {0}")]
    Shape(String),

    #[error("Source text is empty")]
    InputEmpty,
}

impl From<ReplyError> for ExtractionError {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::Malformed(msg) => ExtractionError::MalformedResponse(msg),
            ReplyError::Json(msg) => ExtractionError::JsonParsing(msg),
            ReplyError::Shape(msg) => ExtractionError::Shape(msg),
        }
    }
}
