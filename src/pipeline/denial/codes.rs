use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::claim::dedupe_preserving_order;

static CARC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"CARC\s*(\d+)").unwrap());
static RARC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"RARC\s*([A-Z]\d+)").unwrap());

/// Adjustment reason and remark codes cited in a denial notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialCodes {
    pub carc: Vec<String>,
    pub rarc: Vec<String>,
}

impl DenialCodes {
    pub fn is_empty(&self) -> bool {
        self.carc.is_empty() && self.rarc.is_empty()
    }
}

/// Find `CARC <n>` and `RARC <X n>` mentions, each list in first-seen order.
pub fn extract_codes(text: &str) -> DenialCodes {
    DenialCodes {
        carc: collect_codes(&CARC, text),
        rarc: collect_codes(&RARC, text),
    }
}

fn collect_codes(pattern: &Regex, text: &str) -> Vec<String> {
    dedupe_preserving_order(
        pattern
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .collect(),
    )
}
