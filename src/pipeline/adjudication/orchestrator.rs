use uuid::Uuid;

use super::decision::decide;
use super::evidence::EvidenceExtractor;
use super::report::ClaimReport;
use super::types::{ClaimCriteria, EligibilityOutcome};
use super::AdjudicationError;
use crate::config::ReviewConfig;
use crate::pipeline::document::MedicalRecord;
use crate::pipeline::llm::LlmClient;
use crate::pipeline::questionnaire::{
    build_initial_prompt, build_statements_prompt, build_treatment_outcome_prompt, AnswerLine,
    InitialAnswers, Question, VerificationStatements,
};
use crate::pipeline::retrieval::{LexicalIndex, PassageSearch};

/// Everything produced for one claim.
#[derive(Debug, Clone)]
pub struct ClaimReview {
    pub review_id: Uuid,
    pub criteria: ClaimCriteria,
    pub outcome: EligibilityOutcome,
    pub report: ClaimReport,
}

/// Runs one claim end to end:
/// questions → statements → (treatment follow-up) → evidence → decision → report
pub struct ClaimReviewer {
    llm: Box<dyn LlmClient>,
    config: ReviewConfig,
}

impl ClaimReviewer {
    pub fn new(llm: Box<dyn LlmClient>, config: ReviewConfig) -> Self {
        Self { llm, config }
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Index the record's body passages, then review it.
    pub fn review_record(&self, record: &MedicalRecord) -> Result<ClaimReview, AdjudicationError> {
        let collection = record.retrieval_collection();
        let index = LexicalIndex::build(&collection);
        self.review(record, &index)
    }

    pub fn review(
        &self,
        record: &MedicalRecord,
        search: &dyn PassageSearch,
    ) -> Result<ClaimReview, AdjudicationError> {
        let review_id = Uuid::new_v4();
        let span = tracing::info_span!("review_claim", review_id = %review_id, cpt = self.config.cpt);
        let _enter = span.enter();

        let history = record.full_text();
        if history.trim().is_empty() {
            return Err(AdjudicationError::InputValidation("medical record has no text".into()));
        }

        let response = self.ask(&build_initial_prompt(&history))?;
        let answers = InitialAnswers::parse(&response)?;

        let extractor = EvidenceExtractor::new(
            search,
            self.config.match_threshold,
            self.config.cpt,
            self.config.record_year,
        )
        .with_telangiectasia_policy(self.config.telangiectasia_policy);
        let birth_year = extractor.birth_year(answers.get(Question::BirthYear))?;

        let response = self.ask(&build_statements_prompt(&history, birth_year, self.config.cpt))?;
        let statements = VerificationStatements::parse(&response)?;

        let treatment_outcome = if answers.get(Question::Treatment).is_affirmative() {
            let response = self.ask(&build_treatment_outcome_prompt(&history))?;
            Some(AnswerLine::parse(1, response.trim())?)
        } else {
            None
        };

        let criteria = extractor.extract_all(&answers, &statements, birth_year, treatment_outcome.as_ref())?;

        let outcome = decide(&criteria, self.config.cpt)?;
        tracing::info!(
            decision = %outcome.decision,
            confidence = outcome.confidence.value(),
            "claim adjudicated"
        );

        let report = ClaimReport::assemble(&criteria, &outcome);
        Ok(ClaimReview { review_id, criteria, outcome, report })
    }

    fn ask(&self, prompt: &str) -> Result<String, AdjudicationError> {
        let start = std::time::Instant::now();
        let response = self.llm.generate(&self.config.model, prompt, None)?;
        tracing::debug!(
            model = %self.config.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            response_len = response.len(),
            "extraction response"
        );
        Ok(response)
    }
}
