//! Deterministic claim extraction from anchored labels.
//!
//! Every value set here is a literal substring of the source text. A label
//! that is not found leaves the field at its default; nothing here fails.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::models::claim::{dedupe_preserving_order, ClaimPacket, ServiceLine};

/// `meta.extraction_mode` value for packets built here.
pub const PATTERN_EXTRACTION_MODE: &str = "regex";

/// A scalar label pattern: capture group 1 holds the value.
fn label(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).unwrap()
}

static PATIENT_NAME: LazyLock<Regex> = LazyLock::new(|| label(r"Patient:\s*(.+)"));
static DOB: LazyLock<Regex> = LazyLock::new(|| label(r"DOB:\s*([0-9]{4}-[0-9]{2}-[0-9]{2})"));
static INSURANCE: LazyLock<Regex> = LazyLock::new(|| label(r"Insurance:\s*(.+)"));
static MEMBER_ID: LazyLock<Regex> = LazyLock::new(|| label(r"Member\s*ID:\s*([A-Za-z0-9\-]+)"));
static BILLING_NPI: LazyLock<Regex> =
    LazyLock::new(|| label(r"Billing\s+Provider\s+NPI:\s*([0-9]{10})"));
static RENDERING_NPI: LazyLock<Regex> =
    LazyLock::new(|| label(r"Rendering\s+Provider\s+NPI:\s*([0-9]{10})"));
static ORDERING_PROVIDER: LazyLock<Regex> =
    LazyLock::new(|| label(r"Ordering\s+Provider\s+Name:\s*(.+)"));
static REFERRING_PROVIDER: LazyLock<Regex> =
    LazyLock::new(|| label(r"Referring\s+Provider\s+Identifier/NPI:\s*([0-9]{10})"));
static DATE_OF_SERVICE: LazyLock<Regex> =
    LazyLock::new(|| label(r"Date\s+of\s+Service:\s*([0-9]{4}-[0-9]{2}-[0-9]{2})"));
static PLACE_OF_SERVICE: LazyLock<Regex> =
    LazyLock::new(|| label(r"Place\s+of\s+Service:\s*([0-9]{2})"));

// Section headers
static DIAGNOSES_HEADER: LazyLock<Regex> = LazyLock::new(|| label(r"^\s*Diagnoses\b"));
static PROCEDURES_HEADER: LazyLock<Regex> = LazyLock::new(|| label(r"^\s*Procedures\b"));
static CLINICAL_NOTES_HEADER: LazyLock<Regex> =
    LazyLock::new(|| label(r"^\s*Clinical\s+notes\b"));

// List items (codes are upper-case only)
static DIAGNOSIS_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*([A-Z][0-9A-Z\.]{2,8})\b").unwrap());
static PROCEDURE_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*([0-9]{5}|[A-Z][0-9A-Z]{3,6})\b").unwrap());

// Procedure attributes
static UNITS: LazyLock<Regex> = LazyLock::new(|| label(r"Units:\s*(\d+)"));
static MODIFIERS: LazyLock<Regex> = LazyLock::new(|| label(r"Modifiers?:\s*(.+)"));
static DIAGNOSIS_POINTER: LazyLock<Regex> = LazyLock::new(|| label(r"Diagnosis\s+pointer:\s*(.+)"));
static LIST_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\s]+").unwrap());

/// Build a claim packet using only anchored label matches.
pub fn extract_with_patterns(text: &str) -> ClaimPacket {
    let mut packet = ClaimPacket::default();

    if let Some(name) = find(&PATIENT_NAME, text) {
        packet.patient.name = name;
    }
    packet.patient.dob = find(&DOB, text);
    packet.patient.insurance = find(&INSURANCE, text);
    packet.patient.member_id = find(&MEMBER_ID, text);

    packet.providers.billing_npi = find(&BILLING_NPI, text);
    packet.providers.rendering_npi = find(&RENDERING_NPI, text);
    packet.providers.ordering_provider_name = find(&ORDERING_PROVIDER, text);
    packet.providers.referring_provider_id = find(&REFERRING_PROVIDER, text);

    packet.claim.date_of_service = find(&DATE_OF_SERVICE, text);
    packet.claim.place_of_service = find(&PLACE_OF_SERVICE, text);
    packet.claim.diagnoses = parse_diagnoses(text);
    packet.claim.lines = parse_service_lines(text);

    packet.meta.insert(
        "extraction_mode".into(),
        Value::String(PATTERN_EXTRACTION_MODE.into()),
    );

    tracing::debug!(
        diagnoses = packet.claim.diagnoses.len(),
        lines = packet.claim.lines.len(),
        "Pattern extraction complete"
    );

    packet
}

/// First match wins; the capture is trimmed and blank captures count as missing.
fn find(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Diagnosis codes listed between the `Diagnoses` and `Procedures` headers.
pub fn parse_diagnoses(text: &str) -> Vec<String> {
    let mut codes = Vec::new();
    let mut in_section = false;

    for line in text.lines() {
        if DIAGNOSES_HEADER.is_match(line) {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if PROCEDURES_HEADER.is_match(line) {
            break;
        }
        if let Some(caps) = DIAGNOSIS_ITEM.captures(line.trim()) {
            codes.push(caps[1].to_string());
        }
    }

    dedupe_preserving_order(codes)
}

/// Service lines listed under the `Procedures` header.
pub fn parse_service_lines(text: &str) -> Vec<ServiceLine> {
    let mut lines = Vec::new();
    let mut in_section = false;
    let mut current: Option<ServiceLine> = None;

    for line in text.lines() {
        if PROCEDURES_HEADER.is_match(line) {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if CLINICAL_NOTES_HEADER.is_match(line) {
            break;
        }

        if let Some(caps) = PROCEDURE_ITEM.captures(line) {
            flush(&mut current, &mut lines);
            current = Some(ServiceLine::new(&caps[1]));
            continue;
        }

        let Some(entry) = current.as_mut() else {
            continue;
        };

        if let Some(caps) = UNITS.captures(line) {
            match caps[1].parse::<i64>() {
                Ok(units) => entry.units = units,
                Err(_) => tracing::warn!(
                    digits = caps[1].len(),
                    "Units value out of range, keeping default"
                ),
            }
        } else if let Some(caps) = MODIFIERS.captures(line) {
            entry.modifiers = parse_modifiers(&caps[1]);
        } else if let Some(caps) = DIAGNOSIS_POINTER.captures(line) {
            entry.diagnosis_pointer = parse_pointers(&caps[1]);
        }
    }

    flush(&mut current, &mut lines);
    lines
}

fn flush(current: &mut Option<ServiceLine>, lines: &mut Vec<ServiceLine>) {
    if let Some(mut line) = current.take() {
        if line.cpt_hcpcs.is_empty() {
            return;
        }
        if line.units == 0 {
            line.units = 1;
        }
        lines.push(line);
    }
}

fn parse_modifiers(raw: &str) -> Vec<String> {
    let value = raw.trim();
    if value.to_lowercase().starts_with("(none") {
        return Vec::new();
    }
    LIST_SEPARATOR
        .split(value)
        .map(str::trim)
        .filter(|token| !token.is_empty() && *token != "(none)")
        .map(str::to_string)
        .collect()
}

fn parse_pointers(raw: &str) -> Vec<i64> {
    LIST_SEPARATOR
        .split(raw.trim())
        .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|token| match token.parse() {
            Ok(pointer) => Some(pointer),
            Err(_) => {
                tracing::warn!(digits = token.len(), "Diagnosis pointer out of range, dropped");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::claim::PLACEHOLDER_PATIENT_NAME;

    const SUPERBILL: &str = "\
SUPERBILL (SYNTHETIC)
Patient: Jane Doe
DOB: 1985-04-12
Insurance: Acme Health PPO
Member ID: ACM-123456
Billing Provider NPI: 1234567890
Rendering Provider NPI: 0987654321
Ordering Provider Name: Dr. Alan Smith
Referring Provider Identifier/NPI: 1122334455
Date of Service: 2024-03-15
Place of Service: 11

Diagnoses
- J02.9 Acute pharyngitis
- R50.9 Fever
- J02.9 Acute pharyngitis

Procedures
- 99213 Office visit
  Units: 1
  Modifiers: 25
  Diagnosis pointer: 1, 2
- 87880 Rapid strep
  Units: 2
  Modifiers: (none)
  Diagnosis pointer: 1
- J1885 Ketorolac injection
  Modifiers: QW, 59

Clinical notes
- 99999 should not be billed
";

    #[test]
    fn extracts_all_scalar_fields() {
        let packet = extract_with_patterns(SUPERBILL);
        assert_eq!(packet.patient.name, "Jane Doe");
        assert_eq!(packet.patient.dob.as_deref(), Some("1985-04-12"));
        assert_eq!(packet.patient.insurance.as_deref(), Some("Acme Health PPO"));
        assert_eq!(packet.patient.member_id.as_deref(), Some("ACM-123456"));
        assert_eq!(packet.providers.billing_npi.as_deref(), Some("1234567890"));
        assert_eq!(packet.providers.rendering_npi.as_deref(), Some("0987654321"));
        assert_eq!(
            packet.providers.ordering_provider_name.as_deref(),
            Some("Dr. Alan Smith")
        );
        assert_eq!(
            packet.providers.referring_provider_id.as_deref(),
            Some("1122334455")
        );
        assert_eq!(packet.claim.date_of_service.as_deref(), Some("2024-03-15"));
        assert_eq!(packet.claim.place_of_service.as_deref(), Some("11"));
        assert_eq!(packet.meta["extraction_mode"], "regex");
    }

    #[test]
    fn extracts_service_lines_until_clinical_notes() {
        let packet = extract_with_patterns(SUPERBILL);
        let lines = &packet.claim.lines;
        assert_eq!(lines.len(), 3);

        assert_eq!(lines[0].cpt_hcpcs, "99213");
        assert_eq!(lines[0].units, 1);
        assert_eq!(lines[0].modifiers, vec!["25"]);
        assert_eq!(lines[0].diagnosis_pointer, vec![1, 2]);

        assert_eq!(lines[1].cpt_hcpcs, "87880");
        assert_eq!(lines[1].units, 2);
        assert!(lines[1].modifiers.is_empty());
        assert_eq!(lines[1].diagnosis_pointer, vec![1]);

        assert_eq!(lines[2].cpt_hcpcs, "J1885");
        assert_eq!(lines[2].units, 1);
        assert_eq!(lines[2].modifiers, vec!["QW", "59"]);
        assert!(lines[2].diagnosis_pointer.is_empty());
    }

    #[test]
    fn anchorless_text_yields_defaults_only() {
        let packet = extract_with_patterns("Just some free text\nwith no labels at all.");
        assert_eq!(packet.patient.name, PLACEHOLDER_PATIENT_NAME);
        assert!(packet.patient.dob.is_none());
        assert!(packet.patient.insurance.is_none());
        assert!(packet.patient.member_id.is_none());
        assert!(packet.providers.billing_npi.is_none());
        assert!(packet.providers.rendering_npi.is_none());
        assert!(packet.providers.ordering_provider_name.is_none());
        assert!(packet.providers.referring_provider_id.is_none());
        assert!(packet.claim.date_of_service.is_none());
        assert!(packet.claim.place_of_service.is_none());
        assert!(packet.claim.diagnoses.is_empty());
        assert!(packet.claim.lines.is_empty());
    }

    #[test]
    fn empty_text_does_not_panic() {
        let packet = extract_with_patterns("");
        assert_eq!(packet.patient.name, PLACEHOLDER_PATIENT_NAME);
        assert!(packet.claim.lines.is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        assert_eq!(extract_with_patterns(SUPERBILL), extract_with_patterns(SUPERBILL));
    }

    #[test]
    fn labels_are_case_insensitive() {
        let packet = extract_with_patterns("patient: John Roe\ndob: 2001-01-02\nmember id: X9");
        assert_eq!(packet.patient.name, "John Roe");
        assert_eq!(packet.patient.dob.as_deref(), Some("2001-01-02"));
        assert_eq!(packet.patient.member_id.as_deref(), Some("X9"));
    }

    #[test]
    fn malformed_npi_is_not_captured() {
        let packet = extract_with_patterns("Billing Provider NPI: 12345");
        assert!(packet.providers.billing_npi.is_none());
    }

    #[test]
    fn diagnoses_are_deduplicated_in_first_seen_order() {
        let codes = parse_diagnoses("Diagnoses\n- J02.9\n- R50.9\n- J02.9\nProcedures");
        assert_eq!(codes, vec!["J02.9", "R50.9"]);
    }

    #[test]
    fn diagnoses_ignore_lowercase_and_outside_items() {
        let text = "- Z00.00 before header\nDiagnoses\n- j02.9\n- E11.9\nProcedures\n- R10.9";
        assert_eq!(parse_diagnoses(text), vec!["E11.9"]);
    }

    #[test]
    fn diagnoses_without_header_are_empty() {
        assert!(parse_diagnoses("- J02.9\n- R50.9").is_empty());
    }

    #[test]
    fn single_procedure_with_units_and_modifier() {
        let lines = parse_service_lines("Procedures\n- 99213\nUnits: 2\nModifiers: 25");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].cpt_hcpcs, "99213");
        assert_eq!(lines[0].units, 2);
        assert_eq!(lines[0].modifiers, vec!["25"]);
        assert!(lines[0].diagnosis_pointer.is_empty());
    }

    #[test]
    fn attributes_before_first_code_are_ignored() {
        let lines = parse_service_lines("Procedures\nUnits: 4\n- 99214\nModifiers: 25");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].units, 1);
        assert_eq!(lines[0].modifiers, vec!["25"]);
    }

    #[test]
    fn zero_units_default_to_one() {
        let lines = parse_service_lines("Procedures\n- 99213\nUnits: 0");
        assert_eq!(lines[0].units, 1);
    }

    #[test]
    fn empty_modifier_value_yields_empty_list() {
        let lines = parse_service_lines("Procedures\n- 99213\nModifiers: \n");
        assert!(lines[0].modifiers.is_empty());
    }

    #[test]
    fn none_tokens_are_filtered_from_modifier_lists() {
        assert_eq!(parse_modifiers("25, (none), 59"), vec!["25", "59"]);
        assert!(parse_modifiers("(None)").is_empty());
    }

    #[test]
    fn large_values_survive() {
        let lines = parse_service_lines(
            "Procedures\n- 99213\n  Units: 3000000000\n  Diagnosis pointer: 1, 4000000000\n",
        );
        assert_eq!(lines[0].units, 3_000_000_000);
        assert_eq!(lines[0].diagnosis_pointer, vec![1, 4_000_000_000]);
    }

    #[test]
    fn pointer_beyond_i64_is_dropped() {
        assert_eq!(parse_pointers("2, 99999999999999999999"), vec![2]);
    }

    #[test]
    fn pointers_keep_only_numeric_tokens() {
        assert_eq!(parse_pointers("1, A, 3 4x 2"), vec![1, 3, 2]);
    }

    #[test]
    fn procedures_without_section_header_are_ignored() {
        assert!(parse_service_lines("- 99213\nUnits: 2").is_empty());
    }

    #[test]
    fn clinical_notes_before_any_code_ends_the_scan() {
        let lines = parse_service_lines("Procedures\nClinical notes\n- 99213");
        assert!(lines.is_empty());
    }
}
