//! Evidence reconciliation and eligibility adjudication for screening
//! colonoscopy prior-authorization claims.
//!
//! ```text
//! answers + statements + retrieval → EvidenceExtractor → ClaimCriteria
//!                                  → decide() → EligibilityOutcome → ClaimReport
//! ```

pub mod types;
pub mod evidence;
pub mod decision;
pub mod report;
pub mod orchestrator;

pub use types::*;
pub use evidence::{EvidenceExtractor, QueryKey, QueryRule, TelangiectasiaPolicy, CORROBORATION_TABLE};
pub use decision::decide;
pub use report::{ClaimReport, ReportRow};
pub use orchestrator::{ClaimReview, ClaimReviewer};

use thiserror::Error;

use crate::pipeline::llm::LlmError;
use crate::pipeline::questionnaire::QuestionnaireError;
use crate::pipeline::retrieval::RetrievalError;

/// Fatal errors for one claim. None of them yields a partial report.
#[derive(Error, Debug)]
pub enum AdjudicationError {
    #[error("Extraction service failed: {0}")]
    UpstreamService(#[from] LlmError),

    #[error("Retrieval service failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Malformed extraction response: {0}")]
    MalformedResponse(#[from] QuestionnaireError),

    #[error("Input validation failed: {0}")]
    InputValidation(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
