pub const CLAIM_EXTRACTION_SYSTEM_PROMPT: &str = r#"You are a careful healthcare revenue-cycle assistant.
Extract a ClaimPacket from a synthetic superbill / visit summary.

Hard requirements:
- Output ONLY valid JSON.
- Never invent values (NPIs, member IDs, dates, codes).
- patient.insurance MUST be a single string (payer/plan), not an object.
- patient.member_id MUST be a string if present.
- providers.billing_npi and providers.rendering_npi MUST be 10-digit strings if present.
- claim.diagnoses is a list of ICD-10 codes (strings), e.g. ["J02.9","R50.9"]
- claim.lines is a list of service lines. Each line has:
  - cpt_hcpcs (string)
  - units (int, default 1 if missing)
  - modifiers (list of strings; empty list if none)
  - diagnosis_pointer (list of ints; empty list if missing)
If something is unknown, set it to null/empty list.
"#;

/// Build the user instruction for one source text.
pub fn build_claim_extraction_prompt(text: &str) -> String {
    format!(
        "Extract a ClaimPacket from the following text.\n\n\
         TEXT:\n{text}\n\n\
         Return JSON with keys: patient, providers, claim, meta.\n"
    )
}
