//! Questions put to the extraction service and the strict grammar its
//! line-per-answer responses must satisfy.

pub mod lines;
pub mod prompt;

pub use lines::*;
pub use prompt::*;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum QuestionnaireError {
    #[error("{prompt} response has {actual} lines, expected {expected}")]
    LineCount {
        prompt: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Statement {index} has no true/false verdict: {line:?}")]
    MissingVerdict { index: usize, line: String },

    #[error("Statement {index} is both true and false: {line:?}")]
    AmbiguousVerdict { index: usize, line: String },

    #[error("Answer {index} is empty")]
    EmptyAnswer { index: usize },
}
