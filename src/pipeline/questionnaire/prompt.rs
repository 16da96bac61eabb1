//! Prompt builders for the three questions asked about a record.

/// Number of lines the initial-answers response must contain.
pub const INITIAL_ANSWER_COUNT: usize = 10;
/// Number of lines the verification-statements response must contain.
pub const STATEMENT_COUNT: usize = 9;

const PRE_PROMPT: &str = "Based on the patient information provided below, answer the questions at the end: \n";

const INITIAL_QUESTIONS: &str = "Based on the information above, answer the questions below in order:
1. What year was the patient born in?
2. What is the 5-digit code for requested procedure?
3. Does the patient have rectal bleeding?
4. Does the patient have iron deficiency anemia?
5. Does the patient have abdominal pain?
6. Does the patient have Telangiectasia?
7. Has the patient had colonoscopy before?
8. Did the patient receive any treatment for his current condition?
9. Did anyone in the patient's family have colorectal cancer?
10. Did anyone in the patient's family have colonic adenomatous polyposis of unknown etiology?

Format for the answer should be 'Yes/No/Not possible to determine, reason for the answer'";

/// Ten direct questions, one answer line each.
pub fn build_initial_prompt(medical_history: &str) -> String {
    [PRE_PROMPT, medical_history, INITIAL_QUESTIONS].join("\n\n")
}

/// Nine true/false statements re-checking the same facts from another angle.
/// Statement order is significant; see `Statement`.
pub fn build_statements_prompt(medical_history: &str, birth_year: i32, cpt: u32) -> String {
    let statements = [
        "Based on the information above, identify whether each of the statement below is true or false:\n".to_string(),
        format!("1. The patient was born in year {birth_year}."),
        format!("2. {cpt} is not one of the requested procedures."),
        "3. The patient has had a colonoscopy in the last 10 years.".to_string(),
        "4. The patient recently received a treatment (including over the counter drugs) for his condition.".to_string(),
        "5. The patient has one of the these symptoms: abdominal pain, rectal bleeding, iron deficiency anemia or Telangiectasia".to_string(),
        "6. The patient does not have a family history of colorectal cancer.".to_string(),
        "7. The patient recently received a treatment for his condition and it improved the symptoms.".to_string(),
        "8. Someone in the patient's immediate family had colonic adenomatous polyposis of unknown etiology".to_string(),
        "9. The patient recently received a treatment for his condition and it did not improve the symptoms.".to_string(),
        "\nOnly answer true or false for each statement, do not explain the answer".to_string(),
    ]
    .join("\n");

    [PRE_PROMPT, medical_history, statements.as_str()].join("\n\n")
}

/// Follow-up asked only when the patient did receive treatment.
pub fn build_treatment_outcome_prompt(medical_history: &str) -> String {
    let questions = "Based on the information above, answer the questions below in order:\n\
1. Has the condition of the patient improved based on recent treatment? Disregard any planned treatments\n\n\
Format for the answer should be 'Yes/No/Not possible to determine, reason for the answer'";

    [
        "Based on the patient notes provided below, answer the questions at the end:",
        medical_history,
        questions,
    ]
    .join("\n\n")
}
