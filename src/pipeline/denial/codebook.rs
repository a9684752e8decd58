use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::codes::DenialCodes;
use super::DenialError;
use crate::models::denial::{CodeMeaning, CodeMeanings};

/// Meaning reported for codes absent from the table.
pub const MEANING_NOT_FOUND: &str = "Meaning not found in demo subset.";

const BUILTIN_CODEBOOK: &str = include_str!("../../../data/carc_rarc_subset.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeType {
    #[serde(rename = "CARC")]
    Carc,
    #[serde(rename = "RARC")]
    Rarc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodebookEntry {
    pub code_type: CodeType,
    pub code: String,
    pub meaning: String,
}

/// Read-only (code type, code) → meaning table.
#[derive(Debug, Clone, Default)]
pub struct Codebook {
    meanings: HashMap<(CodeType, String), String>,
}

impl Codebook {
    /// Build from entries; the first entry for a code wins.
    pub fn from_entries(entries: impl IntoIterator<Item = CodebookEntry>) -> Self {
        let mut meanings = HashMap::new();
        for entry in entries {
            meanings
                .entry((entry.code_type, entry.code.trim().to_string()))
                .or_insert(entry.meaning);
        }
        Self { meanings }
    }

    /// Parse a JSON array of `{code_type, code, meaning}` records.
    pub fn from_json_str(json: &str) -> Result<Self, DenialError> {
        let entries: Vec<CodebookEntry> =
            serde_json::from_str(json).map_err(|e| DenialError::Codebook(e.to_string()))?;
        Ok(Self::from_entries(entries))
    }

    /// The demo subset shipped with the crate.
    pub fn builtin() -> Result<Self, DenialError> {
        Self::from_json_str(BUILTIN_CODEBOOK)
    }

    pub fn len(&self) -> usize {
        self.meanings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meanings.is_empty()
    }

    pub fn meaning(&self, code_type: CodeType, code: &str) -> Option<&str> {
        self.meanings
            .get(&(code_type, code.to_string()))
            .map(String::as_str)
    }

    /// Look up every code, substituting [`MEANING_NOT_FOUND`] for unknown ones.
    pub fn lookup_meanings(&self, codes: &DenialCodes) -> CodeMeanings {
        let describe = |code_type: CodeType, code: &String| CodeMeaning {
            code: code.clone(),
            meaning: self
                .meaning(code_type, code)
                .unwrap_or(MEANING_NOT_FOUND)
                .to_string(),
        };

        CodeMeanings {
            carc: codes
                .carc
                .iter()
                .map(|code| describe(CodeType::Carc, code))
                .collect(),
            rarc: codes
                .rarc
                .iter()
                .map(|code| describe(CodeType::Rarc, code))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code_type: CodeType, code: &str, meaning: &str) -> CodebookEntry {
        CodebookEntry {
            code_type,
            code: code.into(),
            meaning: meaning.into(),
        }
    }

    #[test]
    fn looks_up_known_and_unknown_codes() {
        let book = Codebook::from_entries(vec![
            entry(CodeType::Carc, "16", "Claim lacks information."),
            entry(CodeType::Rarc, "M51", "Missing procedure code."),
        ]);
        let codes = DenialCodes {
            carc: vec!["16".into(), "999".into()],
            rarc: vec!["M51".into()],
        };
        let meanings = book.lookup_meanings(&codes);

        assert_eq!(meanings.carc[0].meaning, "Claim lacks information.");
        assert_eq!(meanings.carc[1].code, "999");
        assert_eq!(meanings.carc[1].meaning, MEANING_NOT_FOUND);
        assert_eq!(meanings.rarc[0].meaning, "Missing procedure code.");
    }

    #[test]
    fn code_type_is_part_of_the_key() {
        let book = Codebook::from_entries(vec![entry(CodeType::Rarc, "16", "remark")]);
        assert_eq!(book.meaning(CodeType::Carc, "16"), None);
        assert_eq!(book.meaning(CodeType::Rarc, "16"), Some("remark"));
    }

    #[test]
    fn first_entry_wins() {
        let book = Codebook::from_entries(vec![
            entry(CodeType::Carc, "16", "first"),
            entry(CodeType::Carc, "16", "second"),
        ]);
        assert_eq!(book.meaning(CodeType::Carc, "16"), Some("first"));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn parses_json_records() {
        let book = Codebook::from_json_str(
            r#"[{"code_type": "CARC", "code": "197", "meaning": "Authorization absent."}]"#,
        )
        .unwrap();
        assert_eq!(book.meaning(CodeType::Carc, "197"), Some("Authorization absent."));
    }

    #[test]
    fn rejects_unknown_code_type() {
        let result =
            Codebook::from_json_str(r#"[{"code_type": "XYZ", "code": "1", "meaning": "m"}]"#);
        assert!(matches!(result, Err(DenialError::Codebook(_))));
    }

    #[test]
    fn builtin_subset_has_common_codes() {
        let book = Codebook::builtin().unwrap();
        assert!(!book.is_empty());
        assert!(book.meaning(CodeType::Carc, "16").is_some());
        assert!(book.meaning(CodeType::Rarc, "M51").is_some());
    }
}
