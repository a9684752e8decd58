use serde_json::Value;

/// Resolve a dot-separated path by walking nested objects.
///
/// Returns `None` when any key is missing or an intermediate value is not an
/// object. Never fails.
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |current, key| current.as_object()?.get(key))
}

/// Absent, null, `""` and `[]` all count as blank.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}
