//! Tabular claim report: one row per criterion plus the OUTCOME row.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use super::types::{ClaimCriteria, EligibilityOutcome};
use super::AdjudicationError;

pub const OUTCOME_ROW: &str = "OUTCOME";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Criteria")]
    pub criteria: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Reason")]
    pub reason: String,
    #[serde(rename = "Confidence")]
    pub confidence: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReport {
    rows: Vec<ReportRow>,
}

impl ClaimReport {
    /// Criteria rows in fixed order, then the outcome row. The outcome's
    /// justification is not part of the table.
    pub fn assemble(criteria: &ClaimCriteria, outcome: &EligibilityOutcome) -> Self {
        let mut rows: Vec<ReportRow> = criteria
            .iter()
            .map(|c| ReportRow {
                criteria: c.name().to_string(),
                value: c.value.to_string(),
                reason: c.evidence.clone(),
                confidence: c.confidence.value(),
            })
            .collect();

        rows.push(ReportRow {
            criteria: OUTCOME_ROW.to_string(),
            value: outcome.decision.to_string(),
            reason: String::new(),
            confidence: outcome.confidence.value(),
        });

        Self { rows }
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn get(&self, criteria: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.criteria == criteria)
    }

    pub fn outcome(&self) -> Option<&ReportRow> {
        self.get(OUTCOME_ROW)
    }

    pub fn to_csv(&self) -> Result<String, AdjudicationError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            writer.serialize(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AdjudicationError::Io(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| AdjudicationError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// Rendered in memory first so a failed review never leaves a partial file.
    pub fn write_csv(&self, path: &Path) -> Result<(), AdjudicationError> {
        let csv = self.to_csv()?;
        std::fs::write(path, csv)?;
        tracing::info!(path = %path.display(), rows = self.rows.len(), "report written");
        Ok(())
    }
}

impl fmt::Display for ClaimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.rows.iter().map(|r| r.criteria.len()).max().unwrap_or(0);
        writeln!(f, "{:<width$}  {:<8}  {:>10}  Reason", "Criteria", "Value", "Confidence")?;
        for row in &self.rows {
            let reason = row.reason.replace('\n', " ");
            writeln!(
                f,
                "{:<width$}  {:<8}  {:>10}  {}",
                row.criteria, row.value, row.confidence, reason
            )?;
        }
        Ok(())
    }
}
