use serde::de::DeserializeOwned;
use serde_json::Value;

/// Errors from turning a model reply into a typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyError {
    /// Reply was empty or held no JSON object.
    Malformed(String),
    /// Reply held text that is not valid JSON.
    Json(String),
    /// Valid JSON that does not fit the expected shape.
    Shape(String),
}

/// Parse a model reply into `T`.
///
/// Accepts a bare JSON object or one wrapped in a ```json fence. Nothing is
/// salvaged from a reply that fails to parse.
pub fn parse_model_reply<T: DeserializeOwned>(reply: &str) -> Result<T, ReplyError> {
    let json_str = extract_json_block(reply)?;
    let value: Value =
        serde_json::from_str(json_str).map_err(|e| ReplyError::Json(e.to_string()))?;
    if !value.is_object() {
        return Err(ReplyError::Shape("Top-level JSON value is not an object".into()));
    }
    serde_json::from_value(value).map_err(|e| ReplyError::Shape(e.to_string()))
}

/// Locate the JSON text inside a reply.
fn extract_json_block(reply: &str) -> Result<&str, ReplyError> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Err(ReplyError::Malformed("Empty model reply".into()));
    }

    if let Some(fence_start) = trimmed.find("```json") {
        let content_start = fence_start + 7;
        let fence_len = trimmed[content_start..]
            .find("```")
            .ok_or_else(|| ReplyError::Malformed("Unclosed JSON block".into()))?;
        return Ok(trimmed[content_start..content_start + fence_len].trim());
    }

    Ok(trimmed)
}
