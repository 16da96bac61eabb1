use std::collections::HashMap;

use super::{PassageSearch, RetrievalError, RetrievalMatch};

const BM25_K1: f32 = 1.2;
const BM25_B: f32 = 0.75;
/// Score of an average-length passage holding every indexed query term once.
pub const FULL_COVERAGE_SCORE: f32 = 32.0;

/// In-memory BM25 index over record passages.
///
/// Raw BM25 is rescaled against the query's own idf mass, so scores are
/// comparable across queries: [`FULL_COVERAGE_SCORE`] for full coverage,
/// about half of it when half the weighted terms match. Query terms absent
/// from the whole collection carry no weight.
pub struct LexicalIndex {
    passages: Vec<IndexedPassage>,
    document_frequency: HashMap<String, usize>,
    average_length: f32,
}

struct IndexedPassage {
    content: String,
    term_counts: HashMap<String, usize>,
    length: usize,
}

impl LexicalIndex {
    pub fn build<S: AsRef<str>>(collection: &[S]) -> Self {
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        let passages: Vec<IndexedPassage> = collection
            .iter()
            .map(|text| {
                let tokens = tokenize(text.as_ref());
                let mut term_counts: HashMap<String, usize> = HashMap::new();
                for token in &tokens {
                    *term_counts.entry(token.clone()).or_default() += 1;
                }
                for term in term_counts.keys() {
                    *document_frequency.entry(term.clone()).or_default() += 1;
                }
                IndexedPassage {
                    content: text.as_ref().to_string(),
                    term_counts,
                    length: tokens.len(),
                }
            })
            .collect();

        let total: usize = passages.iter().map(|p| p.length).sum();
        let average_length = if passages.is_empty() {
            0.0
        } else {
            total as f32 / passages.len() as f32
        };

        tracing::info!(passages = passages.len(), terms = document_frequency.len(), "retrieval index built");

        Self {
            passages,
            document_frequency,
            average_length,
        }
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    fn idf(&self, term: &str) -> f32 {
        let n = self.passages.len() as f32;
        let df = self.document_frequency.get(term).copied().unwrap_or(0) as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn score(&self, passage: &IndexedPassage, query_terms: &[String]) -> f32 {
        let length_norm = if self.average_length > 0.0 {
            passage.length as f32 / self.average_length
        } else {
            0.0
        };

        query_terms
            .iter()
            .filter_map(|term| passage.term_counts.get(term).map(|&tf| (term, tf as f32)))
            .map(|(term, tf)| {
                let numerator = tf * (BM25_K1 + 1.0);
                let denominator = tf + BM25_K1 * (1.0 - BM25_B + BM25_B * length_norm);
                self.idf(term) * numerator / denominator
            })
            .sum()
    }
}

impl PassageSearch for LexicalIndex {
    fn search(&self, query: &str) -> Result<Vec<RetrievalMatch>, RetrievalError> {
        let query_terms = tokenize(query);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let ceiling: f32 = query_terms
            .iter()
            .filter(|t| self.document_frequency.contains_key(t.as_str()))
            .map(|t| self.idf(t))
            .sum();
        if ceiling <= 0.0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .passages
            .iter()
            .enumerate()
            .map(|(i, p)| (i, FULL_COVERAGE_SCORE * self.score(p, &query_terms) / ceiling))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        // Stable sort keeps insertion order among ties.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .map(|(i, score)| RetrievalMatch::new(score, self.passages[i].content.clone()))
            .collect())
    }
}

/// Lowercase alphanumeric tokens.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Fixed matches keyed by a query fragment, for tests and offline replays.
#[derive(Default)]
pub struct StaticSearch {
    entries: Vec<(String, RetrievalMatch)>,
    failure: Option<String>,
}

impl StaticSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query fails with `RetrievalError::Backend(reason)`.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            entries: Vec::new(),
            failure: Some(reason.to_string()),
        }
    }

    /// Register `found` for every query containing `fragment` (case-insensitive).
    pub fn with(mut self, fragment: &str, found: RetrievalMatch) -> Self {
        self.entries.push((fragment.to_lowercase(), found));
        self
    }
}

impl PassageSearch for StaticSearch {
    fn search(&self, query: &str) -> Result<Vec<RetrievalMatch>, RetrievalError> {
        if let Some(reason) = &self.failure {
            return Err(RetrievalError::Backend(reason.clone()));
        }
        let query = query.to_lowercase();
        let mut found: Vec<RetrievalMatch> = self
            .entries
            .iter()
            .filter(|(fragment, _)| query.contains(fragment.as_str()))
            .map(|(_, m)| m.clone())
            .collect();
        found.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(found)
    }
}
