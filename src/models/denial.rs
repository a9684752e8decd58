use serde::{Deserialize, Serialize};

/// Remediation guidance for a denied claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenialPlan {
    pub plain_english_summary: String,
    #[serde(default)]
    pub likely_missing_items: Vec<String>,
    #[serde(default)]
    pub correction_steps: Vec<String>,
    pub appeal_draft: String,
}

/// A denial code paired with its human-readable meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMeaning {
    pub code: String,
    pub meaning: String,
}

/// Meanings for every CARC and RARC found in a denial notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMeanings {
    #[serde(rename = "CARC")]
    pub carc: Vec<CodeMeaning>,
    #[serde(rename = "RARC")]
    pub rarc: Vec<CodeMeaning>,
}
