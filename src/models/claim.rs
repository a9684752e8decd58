use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Name used until a source text identifies the patient.
pub const PLACEHOLDER_PATIENT_NAME: &str = "SYNTHETIC PATIENT";

/// Keys checked, in order, when the insurance arrives as an object.
const INSURANCE_OBJECT_KEYS: &[&str] = &["payer", "name", "insurance", "plan"];

/// Structured claim record assembled from one source text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimPacket {
    #[serde(default)]
    pub patient: Patient,
    #[serde(default)]
    pub providers: Providers,
    #[serde(default)]
    pub claim: ClaimInfo,
    /// Provenance and annotations (e.g. `extraction_mode`).
    #[serde(default)]
    pub meta: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(default = "default_patient_name")]
    pub name: String,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub member_id: Option<String>,
    /// Payer or plan, always stored as a single string.
    #[serde(default, deserialize_with = "deserialize_insurance")]
    pub insurance: Option<String>,
}

impl Default for Patient {
    fn default() -> Self {
        Self {
            name: default_patient_name(),
            dob: None,
            member_id: None,
            insurance: None,
        }
    }
}

impl Patient {
    /// True while the name is still the placeholder (or blank).
    pub fn has_placeholder_name(&self) -> bool {
        self.name.trim().is_empty() || self.name == PLACEHOLDER_PATIENT_NAME
    }
}

fn default_patient_name() -> String {
    PLACEHOLDER_PATIENT_NAME.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Providers {
    #[serde(default)]
    pub billing_npi: Option<String>,
    #[serde(default)]
    pub rendering_npi: Option<String>,
    #[serde(default)]
    pub ordering_provider_name: Option<String>,
    #[serde(default)]
    pub referring_provider_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimInfo {
    #[serde(default)]
    pub date_of_service: Option<String>,
    #[serde(default)]
    pub place_of_service: Option<String>,
    #[serde(default)]
    pub diagnoses: Vec<String>,
    #[serde(default)]
    pub lines: Vec<ServiceLine>,
}

/// One billed procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLine {
    pub cpt_hcpcs: String,
    #[serde(default = "default_units", deserialize_with = "deserialize_count")]
    pub units: i64,
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// 1-based positions into `ClaimInfo::diagnoses`.
    #[serde(default, deserialize_with = "deserialize_counts")]
    pub diagnosis_pointer: Vec<i64>,
}

impl ServiceLine {
    pub fn new(cpt_hcpcs: impl Into<String>) -> Self {
        Self {
            cpt_hcpcs: cpt_hcpcs.into(),
            units: default_units(),
            modifiers: Vec::new(),
            diagnosis_pointer: Vec::new(),
        }
    }
}

fn default_units() -> i64 {
    1
}

/// Insurance as it may arrive from a model response.
#[derive(Deserialize)]
#[serde(untagged)]
enum InsuranceField {
    Text(String),
    Structured(Map<String, Value>),
}

impl InsuranceField {
    fn normalize(self) -> Option<String> {
        match self {
            InsuranceField::Text(text) => Some(text),
            InsuranceField::Structured(object) => INSURANCE_OBJECT_KEYS
                .iter()
                .filter_map(|key| object.get(*key))
                .find_map(scalar_text)
                .map(|payer| payer.trim().to_string())
                .filter(|payer| !payer.is_empty()),
        }
    }
}

/// Null, empty strings and zero count as missing.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn deserialize_insurance<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<InsuranceField> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(InsuranceField::normalize))
}

/// Integers may arrive as `2`, `2.0` or `"2"`. Fractions and other types are rejected.
fn lenient_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn count_or_error<E: serde::de::Error>(value: Value) -> Result<i64, E> {
    lenient_count(&value).ok_or_else(|| E::custom(format!("expected an integer, got {value}")))
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    count_or_error(Value::deserialize(deserializer)?)
}

fn deserialize_counts<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .map(count_or_error)
        .collect()
}

/// Remove duplicate codes, keeping the first occurrence of each.
pub fn dedupe_preserving_order(codes: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    codes
        .into_iter()
        .filter(|code| seen.insert(code.clone()))
        .collect()
}
