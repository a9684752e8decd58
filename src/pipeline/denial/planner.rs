use super::DenialError;
use crate::models::denial::{CodeMeanings, DenialPlan};
use crate::pipeline::llm::{parse_model_reply, LlmClient};

pub const DENIAL_SYSTEM_PROMPT: &str = r#"You are a revenue-cycle denial assistant.
Given denial codes and a denial message, produce:
- plain_english_summary
- likely_missing_items (list)
- correction_steps (list)
- appeal_draft (short letter)

Rules:
- Do not suggest fabricating information.
- Keep it practical and brief.
- Output JSON only.
"#;

/// Build the user instruction from the denial text and looked-up meanings.
pub fn build_denial_prompt(denial_text: &str, meanings: &CodeMeanings) -> String {
    let meanings_json = serde_json::to_string_pretty(meanings).unwrap_or_default();
    format!(
        "Denial text:\n{denial_text}\n\n\
         Known meanings:\n{meanings_json}\n\n\
         Return a DenialPlan JSON."
    )
}

/// Ask the model for a remediation plan. One call, no retry.
pub fn build_denial_plan(
    llm: &dyn LlmClient,
    model: &str,
    denial_text: &str,
    meanings: &CodeMeanings,
) -> Result<DenialPlan, DenialError> {
    if denial_text.trim().is_empty() {
        return Err(DenialError::InputEmpty);
    }

    let prompt = build_denial_prompt(denial_text, meanings);
    let reply = llm.complete_json(model, DENIAL_SYSTEM_PROMPT, &prompt)?;
    let plan: DenialPlan = parse_model_reply(&reply)?;

    tracing::info!(
        missing_items = plan.likely_missing_items.len(),
        correction_steps = plan.correction_steps.len(),
        "Denial plan generated"
    );

    Ok(plan)
}
