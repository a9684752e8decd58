pub mod path;
pub mod rules;
pub mod engine;
pub mod questions;

pub use path::*;
pub use rules::*;
pub use engine::*;
pub use questions::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rule configuration parsing error: {0}")]
    Parse(String),

    #[error("Invalid field path in rule configuration: '{0}'")]
    InvalidPath(String),
}
