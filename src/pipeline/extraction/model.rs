use serde_json::Value;

use super::prompt::{build_claim_extraction_prompt, CLAIM_EXTRACTION_SYSTEM_PROMPT};
use super::ExtractionError;
use crate::models::claim::{dedupe_preserving_order, ClaimPacket};
use crate::pipeline::llm::{parse_model_reply, LlmClient};

/// `meta.extraction_mode` value for packets built from a model reply.
pub const MODEL_EXTRACTION_MODE: &str = "llm";

/// Ask the model for a claim packet and validate its shape.
///
/// A transport failure or a reply that does not fit `ClaimPacket` is returned
/// as an error; no partially parsed packet is produced.
pub fn extract_with_model(
    llm: &dyn LlmClient,
    model: &str,
    text: &str,
) -> Result<ClaimPacket, ExtractionError> {
    let prompt = build_claim_extraction_prompt(text);
    let reply = llm.complete_json(model, CLAIM_EXTRACTION_SYSTEM_PROMPT, &prompt)?;
    let packet: ClaimPacket = parse_model_reply(&reply)?;
    Ok(normalize_model_packet(packet))
}

/// Apply packet invariants the model is not trusted to keep.
fn normalize_model_packet(mut packet: ClaimPacket) -> ClaimPacket {
    packet.claim.diagnoses = dedupe_preserving_order(std::mem::take(&mut packet.claim.diagnoses));

    let before = packet.claim.lines.len();
    packet
        .claim
        .lines
        .retain(|line| !line.cpt_hcpcs.trim().is_empty());
    let dropped = before - packet.claim.lines.len();
    if dropped > 0 {
        tracing::warn!(dropped, "Discarded model service lines without a procedure code");
    }

    packet.meta.insert(
        "extraction_mode".into(),
        Value::String(MODEL_EXTRACTION_MODE.into()),
    );
    packet
}
