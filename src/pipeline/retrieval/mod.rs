//! Semantic-retrieval boundary: scores record passages against a query.
//!
//! Adjudication only consumes the top match of each query, as corroboration.

pub mod index;

pub use index::{LexicalIndex, StaticSearch};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Search backend failed: {0}")]
    Backend(String),
}

/// A ranked passage for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMatch {
    pub score: f32,
    pub content: String,
}

impl RetrievalMatch {
    pub fn new(score: f32, content: impl Into<String>) -> Self {
        Self {
            score,
            content: content.into(),
        }
    }

    pub fn exceeds(&self, threshold: f32) -> bool {
        self.score > threshold
    }

    /// Score above threshold and, when given, the expected token literally
    /// present in the passage.
    pub fn corroborates(&self, threshold: f32, expected_token: Option<&str>) -> bool {
        self.exceeds(threshold)
            && expected_token.map_or(true, |token| self.content.contains(token))
    }
}

/// Passage search over one record's collection.
pub trait PassageSearch {
    /// Matches ranked best-first.
    fn search(&self, query: &str) -> Result<Vec<RetrievalMatch>, RetrievalError>;

    fn top_match(&self, query: &str) -> Result<Option<RetrievalMatch>, RetrievalError> {
        let matches = self.search(query)?;
        tracing::debug!(query, matches = matches.len(), "passage search");
        Ok(matches.into_iter().next())
    }
}

impl<T: PassageSearch + ?Sized> PassageSearch for Box<T> {
    fn search(&self, query: &str) -> Result<Vec<RetrievalMatch>, RetrievalError> {
        (**self).search(query)
    }
}
