//! Service facade: one entry point per claims workflow.
//!
//! `ClaimsAutopilot` holds the model client plus the immutable rule set and
//! code table. It carries no mutable state, so a single instance can be
//! shared across threads and serve independent requests.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{ConfigError, Settings};
use crate::models::claim::ClaimPacket;
use crate::models::denial::{CodeMeanings, DenialPlan};
use crate::pipeline::denial::{build_denial_plan, extract_codes, Codebook, DenialError};
use crate::pipeline::extraction::{ClaimExtractor, ExtractionError};
use crate::pipeline::llm::{LlmClient, LlmError, OpenAiClient};
use crate::pipeline::table::{claim_lines_table, ClaimLineRow};
use crate::pipeline::validation::{
    questions_from_issues, validate_packet, Issue, RiskLevel, RuleError, RuleSet,
    ValidationReport,
};

#[derive(Error, Debug)]
pub enum AutopilotError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Claim extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Rule set unavailable: {0}")]
    Rules(#[from] RuleError),

    #[error("Denial analysis failed: {0}")]
    Denial(#[from] DenialError),

    #[error("Claim serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome of a claim pre-check.
#[derive(Debug, Clone, Serialize)]
pub struct PrecheckReport {
    pub run_id: Uuid,
    pub checked_at: DateTime<Utc>,
    pub packet: ClaimPacket,
    pub risk: RiskLevel,
    pub issues: Vec<Issue>,
    /// Follow-up questions for the fields the issues point at.
    pub questions: Vec<String>,
    pub lines: Vec<ClaimLineRow>,
}

/// Outcome of a denial analysis.
#[derive(Debug, Clone, Serialize)]
pub struct DenialAnalysis {
    pub carc: Vec<String>,
    pub rarc: Vec<String>,
    pub meanings: CodeMeanings,
    pub plan: DenialPlan,
}

pub struct ClaimsAutopilot {
    extractor: ClaimExtractor,
    rules: RuleSet,
    codebook: Codebook,
}

impl ClaimsAutopilot {
    pub fn new(
        llm: Box<dyn LlmClient + Send + Sync>,
        model_name: &str,
        rules: RuleSet,
        codebook: Codebook,
    ) -> Self {
        Self {
            extractor: ClaimExtractor::new(llm, model_name),
            rules,
            codebook,
        }
    }

    /// Live client from settings, with the built-in rules and code table.
    pub fn from_settings(settings: &Settings) -> Result<Self, AutopilotError> {
        let client = OpenAiClient::from_settings(settings)?;
        let rules = RuleSet::builtin()?;
        let codebook = Codebook::builtin()?;

        tracing::info!(
            model = %settings.model,
            rules = rules.rule_count(),
            codes = codebook.len(),
            "Claims autopilot ready"
        );

        Ok(Self::new(Box::new(client), &settings.model, rules, codebook))
    }

    pub fn model_name(&self) -> &str {
        self.extractor.model_name()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn codebook(&self) -> &Codebook {
        &self.codebook
    }

    pub fn extract_claim(&self, text: &str) -> Result<ClaimPacket, AutopilotError> {
        Ok(self.extractor.extract(text)?)
    }

    pub fn validate(&self, packet: &ClaimPacket) -> Result<ValidationReport, AutopilotError> {
        Ok(validate_packet(packet, &self.rules)?)
    }

    /// Extract, validate, and summarise a claim in one pass.
    pub fn precheck(&self, text: &str) -> Result<PrecheckReport, AutopilotError> {
        let run_id = Uuid::new_v4();
        let _span = tracing::info_span!("precheck", run_id = %run_id).entered();

        let packet = self.extract_claim(text)?;
        let ValidationReport { risk, issues } = self.validate(&packet)?;
        let questions = questions_from_issues(&issues);
        let lines = claim_lines_table(&packet);

        tracing::info!(
            risk = ?risk,
            issue_count = issues.len(),
            question_count = questions.len(),
            "Pre-check complete"
        );

        Ok(PrecheckReport {
            run_id,
            checked_at: Utc::now(),
            packet,
            risk,
            issues,
            questions,
            lines,
        })
    }

    /// Pull codes from a denial notice, explain them, and draft a plan.
    pub fn analyze_denial(&self, text: &str) -> Result<DenialAnalysis, AutopilotError> {
        if text.trim().is_empty() {
            return Err(DenialError::InputEmpty.into());
        }

        let run_id = Uuid::new_v4();
        let _span = tracing::info_span!("analyze_denial", run_id = %run_id).entered();

        let codes = extract_codes(text);
        if codes.is_empty() {
            tracing::warn!("No CARC/RARC codes found in denial text");
        }

        let meanings = self.codebook.lookup_meanings(&codes);
        let plan = build_denial_plan(
            self.extractor.llm(),
            self.extractor.model_name(),
            text,
            &meanings,
        )?;

        Ok(DenialAnalysis {
            carc: codes.carc,
            rarc: codes.rarc,
            meanings,
            plan,
        })
    }
}
