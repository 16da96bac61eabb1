//! Per-criterion evidence extraction and reconciliation.
//!
//! Each criterion combines up to three signals: the direct extraction answer,
//! the independently phrased verification statement, and the top retrieval
//! match for a criterion-specific query. Extraction vs. statement
//! disagreement always wins and pins confidence at -1.

use serde::{Deserialize, Serialize};

use super::types::{ClaimCriteria, Confidence, Criterion, CriterionResult};
use super::AdjudicationError;
use crate::pipeline::questionnaire::{
    extract_birth_year, extract_n_digit_numbers, AnswerLine, InitialAnswers, Question, Statement,
    StatementLine, VerificationStatements,
};
use crate::pipeline::retrieval::{PassageSearch, RetrievalError, RetrievalMatch};

const NO_TREATMENT_EVIDENCE: &str = "No evidence of conservative treatment found in the medical record";

// ═══════════════════════════════════════════
// Corroboration table
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKey {
    BirthYear,
    ProcedureCode,
    FamilyPolyposis,
    RectalBleeding,
    IronDeficiencyAnemia,
    AbdominalPain,
    Telangiectasia,
    /// Free-text reason from an affirmative answer, queried verbatim.
    AnswerReason,
}

/// How a retrieval query is built and what must appear in the top passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRule {
    pub key: QueryKey,
    /// `{value}` is replaced by the per-claim value.
    pub template: &'static str,
    /// When set, the substituted value must appear literally in the passage.
    pub value_must_appear: bool,
}

pub const CORROBORATION_TABLE: &[QueryRule] = &[
    QueryRule { key: QueryKey::BirthYear, template: "Date of Birth DOB {value}", value_must_appear: true },
    QueryRule { key: QueryKey::ProcedureCode, template: "Requested procedure: {value}", value_must_appear: true },
    QueryRule {
        key: QueryKey::FamilyPolyposis,
        template: "family colonic adenomatous polyposis of unknown etiology",
        value_must_appear: false,
    },
    QueryRule { key: QueryKey::RectalBleeding, template: "Symptoms rectal bleeding", value_must_appear: false },
    QueryRule { key: QueryKey::IronDeficiencyAnemia, template: "Symptoms iron deficiency anemia", value_must_appear: false },
    QueryRule { key: QueryKey::AbdominalPain, template: "Symptoms abdominal discomfort pain", value_must_appear: false },
    QueryRule { key: QueryKey::Telangiectasia, template: "Symptoms Telangiectasia", value_must_appear: false },
    QueryRule { key: QueryKey::AnswerReason, template: "{value}", value_must_appear: false },
];

impl QueryRule {
    pub fn for_key(key: QueryKey) -> &'static QueryRule {
        CORROBORATION_TABLE
            .iter()
            .find(|rule| rule.key == key)
            .unwrap_or(&CORROBORATION_TABLE[CORROBORATION_TABLE.len() - 1])
    }

    pub fn query(&self, value: &str) -> String {
        self.template.replace("{value}", value)
    }

    pub fn expected_token<'v>(&self, value: &'v str) -> Option<&'v str> {
        self.value_must_appear.then_some(value)
    }
}

/// Top match of one query, judged against the threshold.
#[derive(Debug, Clone, PartialEq)]
struct Corroboration {
    top: Option<RetrievalMatch>,
    /// Score alone exceeds the threshold.
    relevant: bool,
    /// Score exceeds the threshold and the expected token is present.
    corroborated: bool,
}

impl Corroboration {
    fn evidence(&self) -> String {
        self.top.as_ref().map(|m| m.content.clone()).unwrap_or_default()
    }
}

/// Which answer gates the Telangiectasia corroboration query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelangiectasiaPolicy {
    /// Queried when the Telangiectasia answer is affirmative.
    #[default]
    OwnAnswer,
    /// Queried when the abdominal-pain answer is affirmative. Reproduces
    /// reports generated before the gate was corrected.
    AbdominalPainAnswer,
}

// ═══════════════════════════════════════════
// Extractor
// ═══════════════════════════════════════════

pub struct EvidenceExtractor<'a> {
    search: &'a dyn PassageSearch,
    threshold: f32,
    cpt: u32,
    record_year: i32,
    telangiectasia_policy: TelangiectasiaPolicy,
}

impl<'a> EvidenceExtractor<'a> {
    pub fn new(search: &'a dyn PassageSearch, threshold: f32, cpt: u32, record_year: i32) -> Self {
        Self {
            search,
            threshold,
            cpt,
            record_year,
            telangiectasia_policy: TelangiectasiaPolicy::default(),
        }
    }

    pub fn with_telangiectasia_policy(mut self, policy: TelangiectasiaPolicy) -> Self {
        self.telangiectasia_policy = policy;
        self
    }

    /// Build all seven criteria. `birth_year` comes from [`Self::birth_year`].
    /// `treatment_outcome` is the follow-up answer on whether treatment
    /// improved the condition; it is only consulted when the treatment answer
    /// is affirmative.
    pub fn extract_all(
        &self,
        answers: &InitialAnswers,
        statements: &VerificationStatements,
        birth_year: i32,
        treatment_outcome: Option<&AnswerLine>,
    ) -> Result<ClaimCriteria, AdjudicationError> {
        let criteria = ClaimCriteria {
            age: self.extract_age(birth_year, statements.get(Statement::BornInYear))?,
            procedure: self.extract_procedure(
                answers.get(Question::ProcedureCode),
                statements.get(Statement::ProcedureNotRequested),
            )?,
            treatment: self.extract_treatment(
                answers.get(Question::Treatment),
                TreatmentStatements {
                    received: statements.get(Statement::RecentTreatment),
                    improved: statements.get(Statement::TreatmentImproved),
                    not_improved: statements.get(Statement::TreatmentDidNotImprove),
                },
                treatment_outcome,
            )?,
            polyposis: self.extract_polyposis(
                answers.get(Question::FamilyPolyposis),
                statements.get(Statement::FamilyPolyposis),
            )?,
            symptomatic: self.extract_symptomatic(
                SymptomAnswers {
                    rectal_bleeding: answers.get(Question::RectalBleeding),
                    anemia: answers.get(Question::IronDeficiencyAnemia),
                    abdominal_pain: answers.get(Question::AbdominalPain),
                    telangiectasia: answers.get(Question::Telangiectasia),
                },
                statements.get(Statement::Symptomatic),
            )?,
            prior_colonoscopy: self.extract_prior_colonoscopy(
                answers.get(Question::PriorColonoscopy),
                statements.get(Statement::ColonoscopyLastTenYears),
            )?,
            cancer_history: self.extract_cancer_history(
                answers.get(Question::FamilyCancer),
                statements.get(Statement::NoFamilyCancer),
            )?,
        };

        for criterion in criteria.iter() {
            tracing::info!(
                criterion = criterion.name(),
                value = %criterion.value,
                confidence = criterion.confidence.value(),
                "criterion extracted"
            );
        }
        Ok(criteria)
    }

    fn corroborate(&self, key: QueryKey, value: &str) -> Result<Corroboration, RetrievalError> {
        let rule = QueryRule::for_key(key);
        let query = rule.query(value);
        let top = self.search.top_match(&query)?;
        let relevant = top.as_ref().is_some_and(|m| m.exceeds(self.threshold));
        let corroborated = top
            .as_ref()
            .is_some_and(|m| m.corroborates(self.threshold, rule.expected_token(value)));
        tracing::debug!(?key, query = %query, relevant, corroborated, "corroboration");
        Ok(Corroboration { top, relevant, corroborated })
    }

    /// First 4-digit number of the birth-year answer, no later than the
    /// record year.
    pub fn birth_year(&self, answer: &AnswerLine) -> Result<i32, AdjudicationError> {
        let birth_year = extract_birth_year(answer.text()).ok_or_else(|| {
            AdjudicationError::InputValidation(format!("no 4-digit birth year in answer: {:?}", answer.text()))
        })?;
        if birth_year > self.record_year {
            return Err(AdjudicationError::InputValidation(format!(
                "birth year {birth_year} is after record year {}",
                self.record_year
            )));
        }
        Ok(birth_year)
    }

    /// Age in years at the record year, for a year validated by
    /// [`Self::birth_year`]. Statement polarity: true ⇒ birth year confirmed.
    pub fn extract_age(&self, birth_year: i32, born_in: &StatementLine) -> Result<CriterionResult, AdjudicationError> {
        let age = self.record_year - birth_year;

        let corroboration = self.corroborate(QueryKey::BirthYear, &birth_year.to_string())?;
        let confidence = if born_in.is_true() {
            Confidence::from_agreement(corroboration.corroborated)
        } else {
            Confidence::DISAGREEMENT
        };

        Ok(CriterionResult::years(Criterion::Age, age, confidence, corroboration.evidence()))
    }

    /// Requested if either the answer names the code or retrieval finds it.
    /// Statement polarity: false ⇒ requested.
    pub fn extract_procedure(
        &self,
        answer: &AnswerLine,
        not_requested: &StatementLine,
    ) -> Result<CriterionResult, AdjudicationError> {
        let code = self.cpt.to_string();
        let named_in_answer = extract_n_digit_numbers(answer.text(), code.len()).contains(&self.cpt);
        let corroboration = self.corroborate(QueryKey::ProcedureCode, &code)?;
        let requested = named_in_answer || corroboration.corroborated;

        let confidence = if requested != not_requested.is_false() {
            Confidence::DISAGREEMENT
        } else {
            Confidence::from_agreement(named_in_answer == corroboration.corroborated)
        };

        Ok(CriterionResult::flag(Criterion::ProcedureCode, requested, confidence, corroboration.evidence()))
    }

    /// Value is "treatment improved the condition". Polarities: statement 4
    /// true ⇒ treated, 7 true ⇒ improved, 9 true ⇒ not improved.
    fn extract_treatment(
        &self,
        answer: &AnswerLine,
        statements: TreatmentStatements<'_>,
        outcome: Option<&AnswerLine>,
    ) -> Result<CriterionResult, AdjudicationError> {
        let Some(reason) = answer.reason() else {
            let confidence = if statements.received.is_true() {
                Confidence::DISAGREEMENT
            } else {
                Confidence::NONE
            };
            return Ok(CriterionResult::flag(Criterion::PriorTreatment, false, confidence, NO_TREATMENT_EVIDENCE));
        };

        let corroboration = self.corroborate(QueryKey::AnswerReason, reason)?;
        let passage = corroboration.evidence();
        let improved = outcome.is_some_and(AnswerLine::is_affirmative);

        let disagrees = statements.received.is_false()
            || if improved {
                statements.improved.is_false() || statements.not_improved.is_true()
            } else {
                statements.improved.is_true() || statements.not_improved.is_false()
            };
        let confidence = if disagrees {
            Confidence::DISAGREEMENT
        } else {
            Confidence::from_agreement(corroboration.relevant)
        };

        let evidence = if improved {
            format!("Patient had a conservative treatment that improved condition as mentioned in the report here:\n{passage}")
        } else {
            passage
        };

        Ok(CriterionResult::flag(Criterion::PriorTreatment, improved, confidence, evidence))
    }

    /// Statement polarity: true ⇒ polyposis in the family.
    pub fn extract_polyposis(
        &self,
        answer: &AnswerLine,
        statement: &StatementLine,
    ) -> Result<CriterionResult, AdjudicationError> {
        let present = answer.is_affirmative();
        let corroboration = self.corroborate(QueryKey::FamilyPolyposis, "")?;

        let confidence = if present != statement.is_true() {
            Confidence::DISAGREEMENT
        } else {
            Confidence::from_agreement(present == corroboration.relevant)
        };

        Ok(CriterionResult::flag(Criterion::Polyposis, present, confidence, corroboration.evidence()))
    }

    /// One confidence point per corroborated symptom. Statement polarity:
    /// true ⇒ symptomatic.
    fn extract_symptomatic(
        &self,
        answers: SymptomAnswers<'_>,
        statement: &StatementLine,
    ) -> Result<CriterionResult, AdjudicationError> {
        let telangiectasia_gate = match self.telangiectasia_policy {
            TelangiectasiaPolicy::OwnAnswer => answers.telangiectasia,
            TelangiectasiaPolicy::AbdominalPainAnswer => answers.abdominal_pain,
        };
        let checks = [
            (answers.rectal_bleeding, QueryKey::RectalBleeding),
            (answers.anemia, QueryKey::IronDeficiencyAnemia),
            (answers.abdominal_pain, QueryKey::AbdominalPain),
            (telangiectasia_gate, QueryKey::Telangiectasia),
        ];

        let mut confidence = Confidence::NONE;
        let mut passages = Vec::new();
        for (gate, key) in checks {
            if !gate.is_affirmative() {
                continue;
            }
            let corroboration = self.corroborate(key, "")?;
            if corroboration.relevant {
                confidence = confidence.corroborated();
                passages.push(corroboration.evidence());
            }
        }

        let symptomatic = [
            answers.rectal_bleeding,
            answers.anemia,
            answers.abdominal_pain,
            answers.telangiectasia,
        ]
        .iter()
        .any(|a| a.is_affirmative());

        if symptomatic != statement.is_true() {
            confidence = Confidence::DISAGREEMENT;
        }

        Ok(CriterionResult::flag(Criterion::Symptomatic, symptomatic, confidence, passages.join("\n")))
    }

    /// Statement polarity: true ⇒ colonoscopy within 10 years.
    pub fn extract_prior_colonoscopy(
        &self,
        answer: &AnswerLine,
        statement: &StatementLine,
    ) -> Result<CriterionResult, AdjudicationError> {
        self.extract_reasoned_flag(Criterion::PriorColonoscopy, answer, statement.is_true())
    }

    /// Statement polarity: "no family history" false ⇒ history present.
    pub fn extract_cancer_history(
        &self,
        answer: &AnswerLine,
        no_history: &StatementLine,
    ) -> Result<CriterionResult, AdjudicationError> {
        self.extract_reasoned_flag(Criterion::FamilyCancerHistory, answer, no_history.is_false())
    }

    /// Affirmative answer's reason is queried for a supporting passage;
    /// `statement_says_present` is the statement mapped to the same polarity.
    fn extract_reasoned_flag(
        &self,
        criterion: Criterion,
        answer: &AnswerLine,
        statement_says_present: bool,
    ) -> Result<CriterionResult, AdjudicationError> {
        let (present, mut confidence, evidence) = match answer.reason() {
            Some(reason) => {
                let corroboration = self.corroborate(QueryKey::AnswerReason, reason)?;
                (
                    true,
                    Confidence::from_agreement(corroboration.relevant),
                    corroboration.evidence(),
                )
            }
            None => (false, Confidence::NONE, String::new()),
        };

        if present != statement_says_present {
            confidence = Confidence::DISAGREEMENT;
        }

        Ok(CriterionResult::flag(criterion, present, confidence, evidence))
    }
}

struct TreatmentStatements<'s> {
    received: &'s StatementLine,
    improved: &'s StatementLine,
    not_improved: &'s StatementLine,
}

struct SymptomAnswers<'s> {
    rectal_bleeding: &'s AnswerLine,
    anemia: &'s AnswerLine,
    abdominal_pain: &'s AnswerLine,
    telangiectasia: &'s AnswerLine,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::retrieval::StaticSearch;

    const THRESHOLD: f32 = 16.0;

    fn answer(text: &str) -> AnswerLine {
        AnswerLine::parse(1, text).unwrap()
    }

    fn statement(verdict: bool) -> StatementLine {
        StatementLine::parse(1, if verdict { "True" } else { "False" }).unwrap()
    }

    fn extractor(search: &StaticSearch) -> EvidenceExtractor<'_> {
        EvidenceExtractor::new(search, THRESHOLD, 45378, 2023)
    }

    #[test]
    fn table_has_one_rule_per_key() {
        let keys = [
            QueryKey::BirthYear,
            QueryKey::ProcedureCode,
            QueryKey::FamilyPolyposis,
            QueryKey::RectalBleeding,
            QueryKey::IronDeficiencyAnemia,
            QueryKey::AbdominalPain,
            QueryKey::Telangiectasia,
            QueryKey::AnswerReason,
        ];
        for key in keys {
            assert_eq!(CORROBORATION_TABLE.iter().filter(|r| r.key == key).count(), 1, "{key:?}");
        }
    }

    #[test]
    fn table_rows_render_queries_and_tokens() {
        let dob = QueryRule::for_key(QueryKey::BirthYear);
        assert_eq!(dob.query("1971"), "Date of Birth DOB 1971");
        assert_eq!(dob.expected_token("1971"), Some("1971"));

        let bleeding = QueryRule::for_key(QueryKey::RectalBleeding);
        assert_eq!(bleeding.query(""), "Symptoms rectal bleeding");
        assert_eq!(bleeding.expected_token(""), None);

        let reason = QueryRule::for_key(QueryKey::AnswerReason);
        assert_eq!(reason.query("colonoscopy in 2019"), "colonoscopy in 2019");
    }

    // ── Age ─────────────────────────────────────────────

    #[test]
    fn age_corroborated_by_dob_passage() {
        let search = StaticSearch::new().with("DOB 1971", RetrievalMatch::new(22.0, "DOB: 04/12/1971"));
        let extractor = extractor(&search);
        let year = extractor.birth_year(&answer("1971, record lists DOB")).unwrap();
        let result = extractor.extract_age(year, &statement(true)).unwrap();
        assert_eq!(result.as_years().unwrap(), 52);
        assert_eq!(result.confidence, Confidence::SINGLE);
        assert_eq!(result.evidence, "DOB: 04/12/1971");
    }

    #[test]
    fn age_passage_without_year_is_uncorroborated() {
        let search = StaticSearch::new().with("DOB 1971", RetrievalMatch::new(22.0, "DOB: unknown"));
        let result = extractor(&search).extract_age(1971, &statement(true)).unwrap();
        assert_eq!(result.confidence, Confidence::NONE);
    }

    #[test]
    fn age_contradicted_by_statement() {
        let search = StaticSearch::new().with("DOB 1971", RetrievalMatch::new(22.0, "DOB: 1971"));
        let result = extractor(&search).extract_age(1971, &statement(false)).unwrap();
        assert_eq!(result.confidence, Confidence::DISAGREEMENT);
    }

    #[test]
    fn age_without_birth_year_is_input_error() {
        let search = StaticSearch::new();
        let err = extractor(&search)
            .birth_year(&answer("Not possible to determine, DOB redacted"))
            .unwrap_err();
        assert!(matches!(err, AdjudicationError::InputValidation(_)));
    }

    #[test]
    fn birth_year_after_record_year_is_input_error() {
        let search = StaticSearch::new();
        let err = extractor(&search).birth_year(&answer("2031")).unwrap_err();
        assert!(matches!(err, AdjudicationError::InputValidation(_)));
    }

    #[test]
    fn birth_year_in_record_year_is_accepted() {
        let search = StaticSearch::new();
        assert_eq!(extractor(&search).birth_year(&answer("2023")).unwrap(), 2023);
    }

    // ── Procedure code ──────────────────────────────────

    #[test]
    fn procedure_named_and_retrieved_agrees() {
        let search = StaticSearch::new()
            .with("Requested procedure", RetrievalMatch::new(25.0, "Requested procedure: 45378"));
        let result = extractor(&search)
            .extract_procedure(&answer("45378, colonoscopy"), &statement(false))
            .unwrap();
        assert!(result.as_flag().unwrap());
        assert_eq!(result.confidence, Confidence::SINGLE);
    }

    #[test]
    fn procedure_found_only_by_retrieval() {
        let search = StaticSearch::new()
            .with("Requested procedure", RetrievalMatch::new(25.0, "Requested procedure: 45378"));
        let result = extractor(&search)
            .extract_procedure(&answer("Not possible to determine, no code"), &statement(false))
            .unwrap();
        assert!(result.as_flag().unwrap());
        assert_eq!(result.confidence, Confidence::NONE);
    }

    #[test]
    fn procedure_absent_everywhere_agrees() {
        let search = StaticSearch::new()
            .with("Requested procedure", RetrievalMatch::new(25.0, "Requested procedure: 45380"));
        let result = extractor(&search)
            .extract_procedure(&answer("45380, polypectomy"), &statement(true))
            .unwrap();
        assert!(!result.as_flag().unwrap());
        assert_eq!(result.confidence, Confidence::SINGLE);
    }

    #[test]
    fn procedure_statement_contradiction() {
        let search = StaticSearch::new();
        let result = extractor(&search)
            .extract_procedure(&answer("45378"), &statement(true))
            .unwrap();
        assert_eq!(result.confidence, Confidence::DISAGREEMENT);
    }

    // ── Treatment ───────────────────────────────────────

    #[test]
    fn untreated_patient_has_no_improvement() {
        let search = StaticSearch::new();
        let statements = TreatmentStatements {
            received: &statement(false),
            improved: &statement(false),
            not_improved: &statement(false),
        };
        let result = extractor(&search)
            .extract_treatment(&answer("No"), statements, None)
            .unwrap();
        assert!(!result.as_flag().unwrap());
        assert_eq!(result.confidence, Confidence::NONE);
        assert_eq!(result.evidence, NO_TREATMENT_EVIDENCE);
    }

    #[test]
    fn untreated_answer_contradicted_by_statement() {
        let search = StaticSearch::new();
        let statements = TreatmentStatements {
            received: &statement(true),
            improved: &statement(false),
            not_improved: &statement(false),
        };
        let result = extractor(&search)
            .extract_treatment(&answer("No"), statements, None)
            .unwrap();
        assert_eq!(result.confidence, Confidence::DISAGREEMENT);
    }

    #[test]
    fn improved_treatment_cites_passage() {
        let search = StaticSearch::new()
            .with("fiber", RetrievalMatch::new(18.0, "Fiber supplements resolved the bleeding."));
        let statements = TreatmentStatements {
            received: &statement(true),
            improved: &statement(true),
            not_improved: &statement(false),
        };
        let outcome = answer("Yes, bleeding stopped after fiber supplements");
        let result = extractor(&search)
            .extract_treatment(&answer("Yes, fiber supplements"), statements, Some(&outcome))
            .unwrap();
        assert!(result.as_flag().unwrap());
        assert_eq!(result.confidence, Confidence::SINGLE);
        assert!(result.evidence.starts_with("Patient had a conservative treatment that improved condition"));
        assert!(result.evidence.ends_with("Fiber supplements resolved the bleeding."));
    }

    #[test]
    fn failed_treatment_contradicted_by_improvement_statement() {
        let search = StaticSearch::new()
            .with("fiber", RetrievalMatch::new(18.0, "Fiber supplements, no change."));
        let statements = TreatmentStatements {
            received: &statement(true),
            improved: &statement(true),
            not_improved: &statement(true),
        };
        let outcome = answer("No, symptoms persist");
        let result = extractor(&search)
            .extract_treatment(&answer("Yes, fiber supplements"), statements, Some(&outcome))
            .unwrap();
        assert!(!result.as_flag().unwrap());
        assert_eq!(result.confidence, Confidence::DISAGREEMENT);
        assert_eq!(result.evidence, "Fiber supplements, no change.");
    }

    // ── Polyposis ───────────────────────────────────────

    #[test]
    fn polyposis_absent_and_unretrieved_agrees() {
        let search = StaticSearch::new()
            .with("polyposis", RetrievalMatch::new(9.0, "Family history: hypertension."));
        let result = extractor(&search)
            .extract_polyposis(&answer("No"), &statement(false))
            .unwrap();
        assert!(!result.as_flag().unwrap());
        assert_eq!(result.confidence, Confidence::SINGLE);
        assert_eq!(result.evidence, "Family history: hypertension.");
    }

    #[test]
    fn polyposis_affirmed_without_passage_is_neutral() {
        let search = StaticSearch::new();
        let result = extractor(&search)
            .extract_polyposis(&answer("Yes, mother had FAP"), &statement(true))
            .unwrap();
        assert!(result.as_flag().unwrap());
        assert_eq!(result.confidence, Confidence::NONE);
    }

    #[test]
    fn polyposis_statement_contradiction() {
        let search = StaticSearch::new();
        let result = extractor(&search)
            .extract_polyposis(&answer("No"), &statement(true))
            .unwrap();
        assert_eq!(result.confidence, Confidence::DISAGREEMENT);
    }

    // ── Symptoms ────────────────────────────────────────

    fn symptom_search() -> StaticSearch {
        StaticSearch::new()
            .with("rectal bleeding", RetrievalMatch::new(21.0, "Bright red blood per rectum."))
            .with("iron deficiency", RetrievalMatch::new(19.0, "Ferritin 8, iron deficiency anemia."))
            .with("abdominal", RetrievalMatch::new(3.0, "Abdomen soft."))
            .with("telangiectasia", RetrievalMatch::new(17.0, "Telangiectasia noted on exam."))
    }

    fn symptoms<'s>(
        bleeding: &'s AnswerLine,
        anemia: &'s AnswerLine,
        pain: &'s AnswerLine,
        tel: &'s AnswerLine,
    ) -> SymptomAnswers<'s> {
        SymptomAnswers {
            rectal_bleeding: bleeding,
            anemia,
            abdominal_pain: pain,
            telangiectasia: tel,
        }
    }

    #[test]
    fn each_corroborated_symptom_adds_a_point() {
        let search = symptom_search();
        let (yes_b, yes_a, yes_p, no) = (
            answer("Yes, hematochezia"),
            answer("Yes, low ferritin"),
            answer("Yes, cramping"),
            answer("No"),
        );
        let result = extractor(&search)
            .extract_symptomatic(symptoms(&yes_b, &yes_a, &yes_p, &no), &statement(true))
            .unwrap();
        assert!(result.as_flag().unwrap());
        // abdominal pain passage scores below threshold
        assert_eq!(result.confidence, Confidence::new(2));
        assert_eq!(
            result.evidence,
            "Bright red blood per rectum.\nFerritin 8, iron deficiency anemia."
        );
    }

    #[test]
    fn asymptomatic_patient_has_zero_confidence() {
        let search = symptom_search();
        let no = answer("No");
        let result = extractor(&search)
            .extract_symptomatic(symptoms(&no, &no, &no, &no), &statement(false))
            .unwrap();
        assert!(!result.as_flag().unwrap());
        assert_eq!(result.confidence, Confidence::NONE);
        assert!(result.evidence.is_empty());
    }

    #[test]
    fn symptom_disagreement_overrides_points() {
        let search = symptom_search();
        let (yes, no) = (answer("Yes, hematochezia"), answer("No"));
        let result = extractor(&search)
            .extract_symptomatic(symptoms(&yes, &no, &no, &no), &statement(false))
            .unwrap();
        assert_eq!(result.confidence, Confidence::DISAGREEMENT);
    }

    #[test]
    fn telangiectasia_corroborated_on_its_own_answer() {
        let search = symptom_search();
        let (yes, no) = (answer("Yes, spider veins on exam"), answer("No"));
        let result = extractor(&search)
            .extract_symptomatic(symptoms(&no, &no, &no, &yes), &statement(true))
            .unwrap();
        assert_eq!(result.confidence, Confidence::SINGLE);
        assert_eq!(result.evidence, "Telangiectasia noted on exam.");
    }

    #[test]
    fn abdominal_pain_gate_reproduces_legacy_reports() {
        let search = symptom_search();
        let (yes, no) = (answer("Yes, spider veins on exam"), answer("No"));
        let legacy = extractor(&search).with_telangiectasia_policy(TelangiectasiaPolicy::AbdominalPainAnswer);

        let result = legacy
            .extract_symptomatic(symptoms(&no, &no, &no, &yes), &statement(true))
            .unwrap();
        // Still symptomatic, but the Telangiectasia passage is never queried.
        assert!(result.as_flag().unwrap());
        assert_eq!(result.confidence, Confidence::NONE);

        let pain = answer("Yes, cramping");
        let result = legacy
            .extract_symptomatic(symptoms(&no, &no, &pain, &no), &statement(true))
            .unwrap();
        assert_eq!(result.confidence, Confidence::SINGLE);
        assert_eq!(result.evidence, "Telangiectasia noted on exam.");
    }

    // ── Colonoscopy / cancer history ────────────────────

    #[test]
    fn prior_colonoscopy_uses_answer_reason_as_query() {
        let search = StaticSearch::new()
            .with("2019", RetrievalMatch::new(20.0, "Colonoscopy 2019: two small polyps removed."));
        let result = extractor(&search)
            .extract_prior_colonoscopy(&answer("Yes, colonoscopy in 2019"), &statement(true))
            .unwrap();
        assert!(result.as_flag().unwrap());
        assert_eq!(result.confidence, Confidence::SINGLE);
        assert_eq!(result.evidence, "Colonoscopy 2019: two small polyps removed.");
    }

    #[test]
    fn no_colonoscopy_has_no_evidence() {
        let search = StaticSearch::new();
        let result = extractor(&search)
            .extract_prior_colonoscopy(&answer("No"), &statement(false))
            .unwrap();
        assert!(!result.as_flag().unwrap());
        assert_eq!(result.confidence, Confidence::NONE);
        assert!(result.evidence.is_empty());
    }

    #[test]
    fn cancer_history_polarity_is_inverted() {
        let search = StaticSearch::new()
            .with("father", RetrievalMatch::new(20.0, "Father: colorectal cancer at 55."));
        let affirmed = answer("Yes, father had colorectal cancer");

        // "does not have a family history" = false ⇒ history present ⇒ agreement
        let result = extractor(&search)
            .extract_cancer_history(&affirmed, &statement(false))
            .unwrap();
        assert_eq!(result.confidence, Confidence::SINGLE);

        let result = extractor(&search)
            .extract_cancer_history(&affirmed, &statement(true))
            .unwrap();
        assert_eq!(result.confidence, Confidence::DISAGREEMENT);
    }

    #[test]
    fn extraction_and_statement_disagreement_is_always_minus_one() {
        let search = symptom_search();
        let ex = extractor(&search);
        let yes = answer("Yes, documented");
        let no = answer("No");

        for (a, s) in [(&yes, statement(false)), (&no, statement(true))] {
            assert!(ex.extract_polyposis(a, &s).unwrap().confidence.is_disagreement());
            assert!(ex.extract_prior_colonoscopy(a, &s).unwrap().confidence.is_disagreement());
        }
        for (a, s) in [(&yes, statement(true)), (&no, statement(false))] {
            assert!(ex.extract_cancer_history(a, &s).unwrap().confidence.is_disagreement());
        }
    }
}
