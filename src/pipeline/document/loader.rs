use std::path::Path;

use super::docx::load_docx;
use super::{DocumentError, MedicalRecord, Paragraph, ParagraphStyle};

/// Load a Word, plain-text or Markdown record. For text records each
/// non-blank line is a paragraph and Markdown `#` lines become headings.
pub fn load_record(path: &Path) -> Result<MedicalRecord, DocumentError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let record = match extension.as_str() {
        "docx" => load_docx(path)?,
        "txt" | "md" | "markdown" => parse_record(&std::fs::read_to_string(path)?),
        _ => return Err(DocumentError::UnsupportedFormat(path.display().to_string())),
    };
    if record.paragraphs().is_empty() {
        return Err(DocumentError::Empty);
    }

    tracing::info!(
        path = %path.display(),
        paragraphs = record.paragraphs().len(),
        "record loaded"
    );
    Ok(record)
}

pub fn parse_record(raw: &str) -> MedicalRecord {
    let paragraphs = raw
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(parse_paragraph)
        .collect();
    MedicalRecord::new(paragraphs)
}

fn parse_paragraph(line: &str) -> Paragraph {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();

    if (1..=6).contains(&level) && trimmed[level..].starts_with(' ') {
        Paragraph {
            text: trimmed[level..].trim().to_string(),
            style: ParagraphStyle::Heading(level as u8),
        }
    } else {
        Paragraph {
            text: line.trim().to_string(),
            style: ParagraphStyle::Normal,
        }
    }
}
