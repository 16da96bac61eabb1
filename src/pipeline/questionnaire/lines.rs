//! Strict per-line grammar for extraction-service responses.
//!
//! A response is split on line breaks, whitespace-only lines are dropped, and
//! the remaining count must match the prompt exactly. Nothing is parsed
//! positionally from a response that fails this check.

use std::sync::LazyLock;

use regex::Regex;

use super::prompt::{INITIAL_ANSWER_COUNT, STATEMENT_COUNT};
use super::QuestionnaireError;

/// Marker whose presence (case-insensitive) affirms an answer.
const AFFIRMATIVE_MARKER: &str = "yes, ";
const UNDETERMINED_MARKER: &str = "not possible to determine";

static ENUMERATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d{1,2}\s*[.)]\s*").expect("static regex"));

// ═══════════════════════════════════════════
// Answers
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerKind {
    /// "Yes, <reason>"; the reason is the text after the first marker.
    Affirmative { reason: String },
    Negative,
    Undetermined,
    /// Anything else, typically a year or a procedure code.
    Freeform,
}

/// One answer to a direct question, enumeration prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerLine {
    text: String,
    kind: AnswerKind,
}

impl AnswerLine {
    /// Validating constructor; `index` is 1-based and only used for errors.
    pub fn parse(index: usize, raw: &str) -> Result<Self, QuestionnaireError> {
        let text = strip_enumeration(raw).trim().to_string();
        if text.is_empty() {
            return Err(QuestionnaireError::EmptyAnswer { index });
        }

        // Markers are ASCII; ASCII lowercasing keeps byte offsets into `text`.
        let lower = text.to_ascii_lowercase();
        let kind = if let Some(pos) = lower.find(AFFIRMATIVE_MARKER) {
            let reason = text[pos + AFFIRMATIVE_MARKER.len()..].trim().to_string();
            AnswerKind::Affirmative { reason }
        } else if lower.contains(UNDETERMINED_MARKER) {
            AnswerKind::Undetermined
        } else if lower == "no" || lower.starts_with("no,") || lower.starts_with("no ") || lower.starts_with("no.") {
            AnswerKind::Negative
        } else {
            AnswerKind::Freeform
        };

        Ok(Self { text, kind })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> &AnswerKind {
        &self.kind
    }

    pub fn is_affirmative(&self) -> bool {
        matches!(self.kind, AnswerKind::Affirmative { .. })
    }

    /// Reason given for an affirmative answer, used as a retrieval query.
    pub fn reason(&self) -> Option<&str> {
        match &self.kind {
            AnswerKind::Affirmative { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Positions of the ten initial answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    BirthYear = 0,
    ProcedureCode = 1,
    RectalBleeding = 2,
    IronDeficiencyAnemia = 3,
    AbdominalPain = 4,
    Telangiectasia = 5,
    PriorColonoscopy = 6,
    Treatment = 7,
    FamilyCancer = 8,
    FamilyPolyposis = 9,
}

/// The ten answers, validated as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialAnswers(Vec<AnswerLine>);

impl InitialAnswers {
    pub fn parse(response: &str) -> Result<Self, QuestionnaireError> {
        let lines = split_lines(response, "initial answers", INITIAL_ANSWER_COUNT)?;
        let answers = lines
            .iter()
            .enumerate()
            .map(|(i, line)| AnswerLine::parse(i + 1, line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(answers))
    }

    pub fn get(&self, question: Question) -> &AnswerLine {
        &self.0[question as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnswerLine> {
        self.0.iter()
    }
}

// ═══════════════════════════════════════════
// Verification statements
// ═══════════════════════════════════════════

/// Positions and wording of the nine verification statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    /// "The patient was born in year <birth_year>."
    BornInYear = 0,
    /// "<code> is not one of the requested procedures."
    ProcedureNotRequested = 1,
    /// "The patient has had a colonoscopy in the last 10 years."
    ColonoscopyLastTenYears = 2,
    /// "The patient recently received a treatment (including OTC drugs)."
    RecentTreatment = 3,
    /// "The patient has one of these symptoms: ..."
    Symptomatic = 4,
    /// "The patient does not have a family history of colorectal cancer."
    NoFamilyCancer = 5,
    /// "... received a treatment and it improved the symptoms."
    TreatmentImproved = 6,
    /// "Someone in the immediate family had colonic adenomatous polyposis ..."
    FamilyPolyposis = 7,
    /// "... received a treatment and it did not improve the symptoms."
    TreatmentDidNotImprove = 8,
}

/// A single true/false verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementLine {
    text: String,
    verdict: bool,
}

impl StatementLine {
    /// Exactly one of "true"/"false" must appear (case-insensitive).
    pub fn parse(index: usize, raw: &str) -> Result<Self, QuestionnaireError> {
        let text = strip_enumeration(raw).trim().to_string();
        let lower = text.to_lowercase();
        let verdict = match (lower.contains("true"), lower.contains("false")) {
            (true, false) => true,
            (false, true) => false,
            (true, true) => {
                return Err(QuestionnaireError::AmbiguousVerdict { index, line: raw.to_string() })
            }
            (false, false) => {
                return Err(QuestionnaireError::MissingVerdict { index, line: raw.to_string() })
            }
        };
        Ok(Self { text, verdict })
    }

    pub fn verdict(&self) -> bool {
        self.verdict
    }

    pub fn is_true(&self) -> bool {
        self.verdict
    }

    pub fn is_false(&self) -> bool {
        !self.verdict
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationStatements(Vec<StatementLine>);

impl VerificationStatements {
    pub fn parse(response: &str) -> Result<Self, QuestionnaireError> {
        let lines = split_lines(response, "verification statements", STATEMENT_COUNT)?;
        let statements = lines
            .iter()
            .enumerate()
            .map(|(i, line)| StatementLine::parse(i + 1, line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(statements))
    }

    pub fn get(&self, statement: Statement) -> &StatementLine {
        &self.0[statement as usize]
    }
}

// ═══════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════

fn split_lines<'a>(
    response: &'a str,
    prompt: &'static str,
    expected: usize,
) -> Result<Vec<&'a str>, QuestionnaireError> {
    let lines: Vec<&str> = response.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() != expected {
        return Err(QuestionnaireError::LineCount {
            prompt,
            expected,
            actual: lines.len(),
        });
    }
    Ok(lines)
}

fn strip_enumeration(line: &str) -> &str {
    match ENUMERATION.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// All standalone numbers of exactly `digits` digits, in order of appearance.
pub fn extract_n_digit_numbers(text: &str, digits: usize) -> Vec<u32> {
    let Ok(pattern) = Regex::new(&format!(r"\b\d{{{digits}}}\b")) else {
        return Vec::new();
    };
    pattern
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// First standalone 4-digit number, read as a birth year.
pub fn extract_birth_year(text: &str) -> Option<i32> {
    extract_n_digit_numbers(text, 4)
        .first()
        .and_then(|&year| i32::try_from(year).ok())
}
