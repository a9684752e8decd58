use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::RuleError;

const BUILTIN_RULES: &str = include_str!("../../../data/rules.json");

/// Declarative validation rules. Every category is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Dotted paths that must resolve to a non-blank value.
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub basic_checks: Vec<BasicCheck>,
    #[serde(default)]
    pub conditional_checks: Vec<ConditionalCheck>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BasicCheck {
    /// The path must resolve to a list with at least `min` items.
    MinListLen {
        path: String,
        #[serde(default = "default_min", deserialize_with = "deserialize_min")]
        min: usize,
        #[serde(default)]
        message: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionalCheck {
    /// When any service line carries one of `codes`, `field` must be present.
    /// `{codes}` in `message` is replaced by the sorted, comma-joined codes.
    RequiresFieldForCodes {
        #[serde(default, deserialize_with = "deserialize_codes")]
        codes: Vec<String>,
        field: String,
        #[serde(default)]
        message: Option<String>,
    },
}

fn default_min() -> usize {
    1
}

/// `min` may be written as `2`, `2.0` or `"2"`.
fn deserialize_min<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let min = match &raw {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    min.and_then(|m| usize::try_from(m).ok()).ok_or_else(|| {
        serde::de::Error::custom(format!("min must be a non-negative integer, got {raw}"))
    })
}

/// Codes may be written as strings or bare numbers (`90837`).
fn deserialize_codes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|code| match code {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

impl RuleSet {
    pub fn from_json_str(json: &str) -> Result<Self, RuleError> {
        let rules: RuleSet =
            serde_json::from_str(json).map_err(|e| RuleError::Parse(e.to_string()))?;
        rules.check_paths()?;
        Ok(rules)
    }

    /// Load a rule set from a JSON file.
    pub fn load(path: &Path) -> Result<Self, RuleError> {
        let json = std::fs::read_to_string(path)?;
        let rules = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            rule_count = rules.rule_count(),
            "Loaded validation rules"
        );
        Ok(rules)
    }

    /// The rule set shipped with the crate.
    pub fn builtin() -> Result<Self, RuleError> {
        Self::from_json_str(BUILTIN_RULES)
    }

    pub fn rule_count(&self) -> usize {
        self.required_fields.len() + self.basic_checks.len() + self.conditional_checks.len()
    }

    /// Reject paths with empty segments (`""`, `a..b`, `.a`).
    fn check_paths(&self) -> Result<(), RuleError> {
        let basic = self.basic_checks.iter().map(|check| match check {
            BasicCheck::MinListLen { path, .. } => path,
        });
        let conditional = self.conditional_checks.iter().map(|check| match check {
            ConditionalCheck::RequiresFieldForCodes { field, .. } => field,
        });

        match self
            .required_fields
            .iter()
            .chain(basic)
            .chain(conditional)
            .find(|path| path.split('.').any(str::is_empty))
        {
            Some(bad) => Err(RuleError::InvalidPath(bad.clone())),
            None => Ok(()),
        }
    }
}
