use std::fmt;

use serde::{Deserialize, Serialize};

use super::AdjudicationError;

// ═══════════════════════════════════════════
// Criteria
// ═══════════════════════════════════════════

/// The seven clinical criteria, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criterion {
    Age,
    ProcedureCode,
    PriorTreatment,
    Polyposis,
    Symptomatic,
    PriorColonoscopy,
    FamilyCancerHistory,
}

impl Criterion {
    pub const ALL: [Criterion; 7] = [
        Self::Age,
        Self::ProcedureCode,
        Self::PriorTreatment,
        Self::Polyposis,
        Self::Symptomatic,
        Self::PriorColonoscopy,
        Self::FamilyCancerHistory,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::ProcedureCode => "cpt",
            Self::PriorTreatment => "prior treatment",
            Self::Polyposis => "polyposis",
            Self::Symptomatic => "symptomatic",
            Self::PriorColonoscopy => "prior colonoscopy",
            Self::FamilyCancerHistory => "family cancer history",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriterionValue {
    Flag(bool),
    Years(i32),
    Text(String),
}

impl fmt::Display for CriterionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(true) => write!(f, "True"),
            Self::Flag(false) => write!(f, "False"),
            Self::Years(years) => write!(f, "{years}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Agreement signal between independent fact sources for one criterion.
///
/// `-1` disagreement, `0` no corroboration, `1` one source agrees, `2+`
/// several independent corroborations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(i32);

impl Confidence {
    pub const DISAGREEMENT: Confidence = Confidence(-1);
    pub const NONE: Confidence = Confidence(0);
    pub const SINGLE: Confidence = Confidence(1);

    pub fn new(value: i32) -> Self {
        Self(value.max(-1))
    }

    /// `1` when the two signals agree, `0` otherwise.
    pub fn from_agreement(agrees: bool) -> Self {
        if agrees {
            Self::SINGLE
        } else {
            Self::NONE
        }
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    pub fn is_disagreement(&self) -> bool {
        *self == Self::DISAGREEMENT
    }

    /// Add one corroboration point (no-op once disagreement is recorded).
    pub fn corroborated(self) -> Self {
        if self.is_disagreement() {
            self
        } else {
            Self(self.0 + 1)
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub criterion: Criterion,
    pub value: CriterionValue,
    pub confidence: Confidence,
    pub evidence: String,
}

impl CriterionResult {
    pub fn flag(criterion: Criterion, value: bool, confidence: Confidence, evidence: impl Into<String>) -> Self {
        Self {
            criterion,
            value: CriterionValue::Flag(value),
            confidence,
            evidence: evidence.into(),
        }
    }

    pub fn years(criterion: Criterion, value: i32, confidence: Confidence, evidence: impl Into<String>) -> Self {
        Self {
            criterion,
            value: CriterionValue::Years(value),
            confidence,
            evidence: evidence.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.criterion.label()
    }

    /// Boolean value, or an input-validation error naming the criterion.
    pub fn as_flag(&self) -> Result<bool, AdjudicationError> {
        match self.value {
            CriterionValue::Flag(flag) => Ok(flag),
            ref other => Err(AdjudicationError::InputValidation(format!(
                "criterion '{}' must be a yes/no value, got {other:?}",
                self.name()
            ))),
        }
    }

    /// Whole-year value, or an input-validation error naming the criterion.
    pub fn as_years(&self) -> Result<i32, AdjudicationError> {
        match self.value {
            CriterionValue::Years(years) if years >= 0 => Ok(years),
            ref other => Err(AdjudicationError::InputValidation(format!(
                "criterion '{}' must be a non-negative age, got {other:?}",
                self.name()
            ))),
        }
    }
}

/// All seven criteria for one claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimCriteria {
    pub age: CriterionResult,
    pub procedure: CriterionResult,
    pub treatment: CriterionResult,
    pub polyposis: CriterionResult,
    pub symptomatic: CriterionResult,
    pub prior_colonoscopy: CriterionResult,
    pub cancer_history: CriterionResult,
}

impl ClaimCriteria {
    /// Criteria in report order.
    pub fn iter(&self) -> impl Iterator<Item = &CriterionResult> {
        [
            &self.age,
            &self.procedure,
            &self.treatment,
            &self.polyposis,
            &self.symptomatic,
            &self.prior_colonoscopy,
            &self.cancer_history,
        ]
        .into_iter()
    }
}

// ═══════════════════════════════════════════
// Outcome
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Declined,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved => write!(f, "Approved"),
            Self::Declined => write!(f, "Declined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityOutcome {
    pub decision: Decision,
    pub confidence: Confidence,
    pub reason: String,
}

/// Running minimum over every criterion consulted on the decision path.
///
/// Seeded with the procedure-code and age confidences, which every path
/// consults first; it can only move down from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceTracker {
    floor: Confidence,
}

impl ConfidenceTracker {
    pub fn new(procedure: &CriterionResult, age: &CriterionResult) -> Self {
        Self {
            floor: procedure.confidence.min(age.confidence),
        }
    }

    pub fn consult(&mut self, criteria: &[&CriterionResult]) {
        for criterion in criteria {
            self.floor = self.floor.min(criterion.confidence);
        }
    }

    pub fn current(&self) -> Confidence {
        self.floor
    }

    pub fn approve(self, reason: impl Into<String>) -> EligibilityOutcome {
        self.finish(Decision::Approved, reason)
    }

    pub fn decline(self, reason: impl Into<String>) -> EligibilityOutcome {
        self.finish(Decision::Declined, reason)
    }

    fn finish(self, decision: Decision, reason: impl Into<String>) -> EligibilityOutcome {
        EligibilityOutcome {
            decision,
            confidence: self.floor,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag_with(confidence: i32) -> CriterionResult {
        CriterionResult::flag(Criterion::Polyposis, true, Confidence::new(confidence), "")
    }

    #[test]
    fn tracker_starts_at_floor_of_procedure_and_age() {
        let procedure = CriterionResult::flag(Criterion::ProcedureCode, true, Confidence::new(1), "");
        let age = CriterionResult::years(Criterion::Age, 50, Confidence::new(0), "");
        assert_eq!(ConfidenceTracker::new(&procedure, &age).current(), Confidence::NONE);
    }

    #[test]
    fn tracker_never_rises() {
        let procedure = CriterionResult::flag(Criterion::ProcedureCode, true, Confidence::new(1), "");
        let age = CriterionResult::years(Criterion::Age, 50, Confidence::new(1), "");
        let mut tracker = ConfidenceTracker::new(&procedure, &age);

        tracker.consult(&[&flag_with(4)]);
        assert_eq!(tracker.current(), Confidence::SINGLE);

        tracker.consult(&[&flag_with(3), &flag_with(-1)]);
        assert_eq!(tracker.current(), Confidence::DISAGREEMENT);
    }

    #[test]
    fn corroboration_points_stop_at_disagreement() {
        assert_eq!(Confidence::NONE.corroborated().corroborated(), Confidence::new(2));
        assert_eq!(Confidence::DISAGREEMENT.corroborated(), Confidence::DISAGREEMENT);
    }

    #[test]
    fn confidence_is_clamped_at_disagreement() {
        assert_eq!(Confidence::new(-7), Confidence::DISAGREEMENT);
    }

    #[test]
    fn typed_accessors_reject_wrong_shapes() {
        let age_as_text = CriterionResult {
            criterion: Criterion::Age,
            value: CriterionValue::Text("fifty".into()),
            confidence: Confidence::SINGLE,
            evidence: String::new(),
        };
        assert!(matches!(age_as_text.as_years(), Err(AdjudicationError::InputValidation(_))));

        let negative = CriterionResult::years(Criterion::Age, -3, Confidence::SINGLE, "");
        assert!(negative.as_years().is_err());

        let age_as_flag = CriterionResult::years(Criterion::Age, 50, Confidence::SINGLE, "");
        assert!(age_as_flag.as_flag().is_err());
    }

    #[test]
    fn values_render_like_the_report() {
        assert_eq!(CriterionValue::Flag(true).to_string(), "True");
        assert_eq!(CriterionValue::Years(52).to_string(), "52");
        assert_eq!(Decision::Declined.to_string(), "Declined");
    }

    #[test]
    fn labels_follow_report_order() {
        let labels: Vec<_> = Criterion::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels[0], "age");
        assert_eq!(labels[1], "cpt");
        assert_eq!(labels[6], "family cancer history");
    }
}
