use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::path::{is_blank, resolve_path};
use super::rules::{BasicCheck, ConditionalCheck, RuleSet};
use crate::models::claim::ClaimPacket;

const DEFAULT_CHECK_MESSAGE: &str = "Check failed";
const DEFAULT_CONDITIONAL_MESSAGE: &str = "Missing field for codes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingRequired,
    CheckFailed,
    ConditionalMissing,
}

impl IssueKind {
    /// Blocking issues force a HIGH risk on their own.
    pub fn is_blocking(self) -> bool {
        matches!(self, IssueKind::MissingRequired | IssueKind::ConditionalMissing)
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub risk: RiskLevel,
    pub issues: Vec<Issue>,
}

/// Evaluate `rules` against an untyped claim record.
///
/// Issues come out in declaration order: required fields, then basic checks,
/// then conditional checks.
pub fn validate(record: &Value, rules: &RuleSet) -> ValidationReport {
    let mut issues = Vec::new();

    check_required_fields(record, rules, &mut issues);
    check_basic(record, rules, &mut issues);
    check_conditional(record, rules, &mut issues);

    let risk = derive_risk(&issues);

    tracing::debug!(
        risk = ?risk,
        issue_count = issues.len(),
        "Claim validation complete"
    );

    ValidationReport { risk, issues }
}

/// Validate a typed packet through its JSON form.
pub fn validate_packet(
    packet: &ClaimPacket,
    rules: &RuleSet,
) -> Result<ValidationReport, serde_json::Error> {
    let record = serde_json::to_value(packet)?;
    Ok(validate(&record, rules))
}

/// HIGH if any blocking issue, MEDIUM if any issue, otherwise LOW.
pub fn derive_risk(issues: &[Issue]) -> RiskLevel {
    if issues.iter().any(|issue| issue.kind.is_blocking()) {
        RiskLevel::High
    } else if !issues.is_empty() {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn check_required_fields(record: &Value, rules: &RuleSet, issues: &mut Vec<Issue>) {
    for field in &rules.required_fields {
        if is_blank(resolve_path(record, field)) {
            issues.push(Issue {
                kind: IssueKind::MissingRequired,
                field: field.clone(),
                message: format!("Missing required field: {field}"),
            });
        }
    }
}

fn check_basic(record: &Value, rules: &RuleSet, issues: &mut Vec<Issue>) {
    for check in &rules.basic_checks {
        match check {
            BasicCheck::MinListLen { path, min, message } => {
                let long_enough = resolve_path(record, path)
                    .and_then(Value::as_array)
                    .is_some_and(|items| items.len() >= *min);
                if !long_enough {
                    issues.push(Issue {
                        kind: IssueKind::CheckFailed,
                        field: path.clone(),
                        message: message
                            .clone()
                            .unwrap_or_else(|| DEFAULT_CHECK_MESSAGE.to_string()),
                    });
                }
            }
        }
    }
}

fn check_conditional(record: &Value, rules: &RuleSet, issues: &mut Vec<Issue>) {
    if rules.conditional_checks.is_empty() {
        return;
    }
    let billed = service_codes(record);

    for check in &rules.conditional_checks {
        match check {
            ConditionalCheck::RequiresFieldForCodes {
                codes,
                field,
                message,
            } => {
                let triggers: BTreeSet<&str> = codes.iter().map(String::as_str).collect();
                let triggered = triggers.iter().any(|code| billed.contains(*code));
                if triggered && is_blank(resolve_path(record, field)) {
                    let joined = triggers.into_iter().collect::<Vec<_>>().join(",");
                    let template = message.as_deref().unwrap_or(DEFAULT_CONDITIONAL_MESSAGE);
                    issues.push(Issue {
                        kind: IssueKind::ConditionalMissing,
                        field: field.clone(),
                        message: template.replace("{codes}", &joined),
                    });
                }
            }
        }
    }
}

/// Procedure codes present on `claim.lines`, trimmed.
fn service_codes(record: &Value) -> HashSet<String> {
    resolve_path(record, "claim.lines")
        .and_then(Value::as_array)
        .map(|lines| {
            lines
                .iter()
                .filter_map(|line| match line.get("cpt_hcpcs")? {
                    Value::String(code) if !code.is_empty() => Some(code.trim().to_string()),
                    Value::Number(code) => Some(code.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::claim::ServiceLine;
    use serde_json::json;

    fn complete_record() -> Value {
        json!({
            "patient": {"name": "Jane Doe", "member_id": "ACM-1"},
            "providers": {"billing_npi": "1234567890", "ordering_provider_name": null},
            "claim": {
                "date_of_service": "2024-03-15",
                "diagnoses": ["J02.9"],
                "lines": [{"cpt_hcpcs": "99213"}]
            }
        })
    }

    fn rules(json: &str) -> RuleSet {
        RuleSet::from_json_str(json).unwrap()
    }

    #[test]
    fn clean_record_is_low_risk() {
        let report = validate(
            &complete_record(),
            &rules(
                r#"{"required_fields": ["patient.member_id", "claim.date_of_service"],
                    "basic_checks": [{"type": "min_list_len", "path": "claim.lines"}]}"#,
            ),
        );
        assert_eq!(report.risk, RiskLevel::Low);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn missing_required_field_is_high_risk() {
        let report = validate(
            &complete_record(),
            &rules(r#"{"required_fields": ["providers.rendering_npi"]}"#),
        );
        assert_eq!(report.risk, RiskLevel::High);
        assert_eq!(
            report.issues,
            vec![Issue {
                kind: IssueKind::MissingRequired,
                field: "providers.rendering_npi".into(),
                message: "Missing required field: providers.rendering_npi".into(),
            }]
        );
    }

    #[test]
    fn empty_string_and_empty_list_are_missing() {
        let record = json!({"patient": {"member_id": ""}, "claim": {"diagnoses": []}});
        let report = validate(
            &record,
            &rules(r#"{"required_fields": ["patient.member_id", "claim.diagnoses"]}"#),
        );
        assert_eq!(report.issues.len(), 2);
    }

    #[test]
    fn basic_check_failure_alone_is_medium_risk() {
        let report = validate(
            &complete_record(),
            &rules(
                r#"{"basic_checks": [{"type": "min_list_len", "path": "claim.lines", "min": 2,
                                      "message": "Need two lines"}]}"#,
            ),
        );
        assert_eq!(report.risk, RiskLevel::Medium);
        assert_eq!(report.issues[0].kind, IssueKind::CheckFailed);
        assert_eq!(report.issues[0].field, "claim.lines");
        assert_eq!(report.issues[0].message, "Need two lines");
    }

    #[test]
    fn min_list_len_on_non_list_fails_with_default_message() {
        let report = validate(
            &complete_record(),
            &rules(r#"{"basic_checks": [{"type": "min_list_len", "path": "patient.name"}]}"#),
        );
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].message, "Check failed");
    }

    #[test]
    fn conditional_check_fires_for_trigger_code() {
        let record = json!({
            "claim": {"date_of_service": null, "lines": [{"cpt_hcpcs": "90837"}]}
        });
        let report = validate(
            &record,
            &rules(
                r#"{"conditional_checks": [{"type": "requires_field_for_codes",
                     "codes": ["90837"], "field": "claim.date_of_service",
                     "message": "Date of service required for {codes}"}]}"#,
            ),
        );
        assert_eq!(report.risk, RiskLevel::High);
        assert_eq!(
            report.issues,
            vec![Issue {
                kind: IssueKind::ConditionalMissing,
                field: "claim.date_of_service".into(),
                message: "Date of service required for 90837".into(),
            }]
        );
    }

    #[test]
    fn conditional_message_lists_sorted_rule_codes() {
        let record = json!({"claim": {"lines": [{"cpt_hcpcs": " 90837 "}]}});
        let report = validate(
            &record,
            &rules(
                r#"{"conditional_checks": [{"type": "requires_field_for_codes",
                     "codes": ["90837", "90832", 90834], "field": "providers.referring_provider_id",
                     "message": "Referral needed ({codes})"}]}"#,
            ),
        );
        assert_eq!(report.issues[0].message, "Referral needed (90832,90834,90837)");
    }

    #[test]
    fn conditional_check_ignores_untriggered_codes() {
        let record = json!({"claim": {"lines": [{"cpt_hcpcs": "99213"}]}});
        let report = validate(
            &record,
            &rules(
                r#"{"conditional_checks": [{"type": "requires_field_for_codes",
                     "codes": ["90837"], "field": "claim.date_of_service"}]}"#,
            ),
        );
        assert_eq!(report.risk, RiskLevel::Low);
    }

    #[test]
    fn conditional_check_passes_when_field_present() {
        let record = json!({
            "claim": {"date_of_service": "2024-03-15", "lines": [{"cpt_hcpcs": "90837"}]}
        });
        let report = validate(
            &record,
            &rules(
                r#"{"conditional_checks": [{"type": "requires_field_for_codes",
                     "codes": ["90837"], "field": "claim.date_of_service"}]}"#,
            ),
        );
        assert!(report.issues.is_empty());
    }

    #[test]
    fn conditional_default_message() {
        let record = json!({"claim": {"lines": [{"cpt_hcpcs": "90837"}]}});
        let report = validate(
            &record,
            &rules(
                r#"{"conditional_checks": [{"type": "requires_field_for_codes",
                     "codes": ["90837"], "field": "claim.date_of_service"}]}"#,
            ),
        );
        assert_eq!(report.issues[0].message, "Missing field for codes");
    }

    #[test]
    fn issues_follow_category_then_declaration_order() {
        let record = json!({"claim": {"lines": [{"cpt_hcpcs": "90837"}]}});
        let report = validate(
            &record,
            &rules(
                r#"{
                  "conditional_checks": [{"type": "requires_field_for_codes",
                     "codes": ["90837"], "field": "claim.date_of_service"}],
                  "basic_checks": [{"type": "min_list_len", "path": "claim.diagnoses"}],
                  "required_fields": ["providers.billing_npi", "patient.member_id"]
                }"#,
            ),
        );
        let fields: Vec<_> = report.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "providers.billing_npi",
                "patient.member_id",
                "claim.diagnoses",
                "claim.date_of_service"
            ]
        );
    }

    #[test]
    fn risk_priority_is_not_a_count() {
        let soft = Issue {
            kind: IssueKind::CheckFailed,
            field: "claim.lines".into(),
            message: String::new(),
        };
        let blocking = Issue {
            kind: IssueKind::ConditionalMissing,
            field: "claim.date_of_service".into(),
            message: String::new(),
        };
        let mut issues = vec![soft.clone(); 5];
        assert_eq!(derive_risk(&issues), RiskLevel::Medium);
        issues.push(blocking);
        assert_eq!(derive_risk(&issues), RiskLevel::High);
        assert_eq!(derive_risk(&[]), RiskLevel::Low);
    }

    #[test]
    fn report_serializes_to_wire_shape() {
        let report = ValidationReport {
            risk: RiskLevel::High,
            issues: vec![Issue {
                kind: IssueKind::MissingRequired,
                field: "patient.member_id".into(),
                message: "Missing required field: patient.member_id".into(),
            }],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["risk"], "HIGH");
        assert_eq!(value["issues"][0]["type"], "missing_required");
        assert_eq!(value["issues"][0]["field"], "patient.member_id");
    }

    #[test]
    fn typed_packet_validates_through_json() {
        let mut packet = ClaimPacket::default();
        packet.claim.lines.push(ServiceLine::new("90837"));
        let report = validate_packet(
            &packet,
            &rules(
                r#"{"required_fields": ["patient.name"],
                    "conditional_checks": [{"type": "requires_field_for_codes",
                     "codes": ["90837"], "field": "claim.date_of_service"}]}"#,
            ),
        )
        .unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::ConditionalMissing);
        assert_eq!(report.issues[0].field, "claim.date_of_service");
    }
}
