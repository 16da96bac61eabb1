//! Document-source boundary: a medical record as ordered, styled paragraphs.

pub mod docx;
pub mod loader;

pub use loader::load_record;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Paragraphs shorter than this (spaces removed) are not worth indexing.
const MIN_INDEXED_CHARS: usize = 10;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported record format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid .docx archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid .docx XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Record contains no text")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParagraphStyle {
    Heading(u8),
    Normal,
    /// Any other named style, e.g. `ListParagraph`.
    Other(String),
}

impl ParagraphStyle {
    pub fn name(&self) -> String {
        match self {
            Self::Heading(level) => format!("Heading {level}"),
            Self::Normal => "Normal".to_string(),
            Self::Other(name) => name.clone(),
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, Self::Heading(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub style: ParagraphStyle,
}

/// One patient record, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicalRecord {
    paragraphs: Vec<Paragraph>,
}

impl MedicalRecord {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Newline-joined text of every paragraph, headings included.
    pub fn full_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Passages handed to the retrieval index: body text of useful length.
    pub fn retrieval_collection(&self) -> Vec<String> {
        self.paragraphs
            .iter()
            .filter(|p| !p.style.is_heading())
            .filter(|p| p.text.chars().filter(|c| *c != ' ').count() > MIN_INDEXED_CHARS)
            .map(|p| p.text.clone())
            .collect()
    }
}
