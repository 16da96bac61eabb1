pub mod adjudication;
pub mod document;
pub mod llm;
pub mod questionnaire;
pub mod retrieval;
