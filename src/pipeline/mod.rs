pub mod llm;
pub mod extraction;
pub mod validation;
pub mod denial;
pub mod table; // Claim-lines grid view
