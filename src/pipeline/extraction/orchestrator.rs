use super::model::extract_with_model;
use super::patterns::extract_with_patterns;
use super::reconcile::reconcile;
use super::ExtractionError;
use crate::models::claim::ClaimPacket;
use crate::pipeline::llm::LlmClient;

/// Orchestrates claim extraction from one source text:
/// patterns + model → reconcile → packet
pub struct ClaimExtractor {
    llm: Box<dyn LlmClient + Send + Sync>,
    model_name: String,
}

impl ClaimExtractor {
    pub fn new(llm: Box<dyn LlmClient + Send + Sync>, model_name: &str) -> Self {
        Self {
            llm,
            model_name: model_name.to_string(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn llm(&self) -> &(dyn LlmClient + Send + Sync) {
        self.llm.as_ref()
    }

    /// Extract and reconcile a claim packet.
    ///
    /// The model reply is primary. If the model call fails the whole
    /// extraction fails; the pattern packet is only ever used to backfill a
    /// successful model reply.
    pub fn extract(&self, text: &str) -> Result<ClaimPacket, ExtractionError> {
        extract_claim_from_text(self.llm.as_ref(), &self.model_name, text)
    }
}

/// Run both extractors on `text` and reconcile their packets.
pub fn extract_claim_from_text(
    llm: &dyn LlmClient,
    model: &str,
    text: &str,
) -> Result<ClaimPacket, ExtractionError> {
    if text.trim().is_empty() {
        return Err(ExtractionError::InputEmpty);
    }

    let pattern_packet = extract_with_patterns(text);

    let model_packet = extract_with_model(llm, model, text).map_err(|e| {
        tracing::error!(error = %e, "Model extraction failed");
        e
    })?;

    let merged = reconcile(model_packet, pattern_packet);

    tracing::info!(
        diagnoses = merged.claim.diagnoses.len(),
        lines = merged.claim.lines.len(),
        "Claim packet reconciled"
    );

    Ok(merged)
}
