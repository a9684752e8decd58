use std::collections::HashSet;

use super::engine::Issue;

/// Follow-up question for each field a biller can supply.
const FIELD_QUESTIONS: &[(&str, &str)] = &[
    ("patient.member_id", "What is the insurance member ID?"),
    ("providers.billing_npi", "What is the billing provider NPI?"),
    ("providers.rendering_npi", "What is the rendering provider NPI?"),
    (
        "providers.ordering_provider_name",
        "What is the ordering provider name?",
    ),
    (
        "providers.referring_provider_id",
        "What is the referring provider identifier/NPI?",
    ),
    (
        "claim.date_of_service",
        "What is the date of service (YYYY-MM-DD)?",
    ),
    (
        "claim.place_of_service",
        "What is the place of service (e.g., 11 for office)?",
    ),
];

pub fn question_for_field(field: &str) -> Option<&'static str> {
    FIELD_QUESTIONS
        .iter()
        .find(|(known, _)| *known == field)
        .map(|(_, question)| *question)
}

/// Questions to ask for the given issues, first-seen order, no repeats.
/// Issues on fields without a known question are skipped.
pub fn questions_from_issues(issues: &[Issue]) -> Vec<String> {
    let mut seen = HashSet::new();
    issues
        .iter()
        .filter_map(|issue| question_for_field(&issue.field))
        .filter(|question| seen.insert(*question))
        .map(str::to_string)
        .collect()
}
