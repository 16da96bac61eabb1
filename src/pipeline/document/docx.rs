//! Word records: paragraph text and style ids from `word/document.xml`.

use std::io::Read;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{DocumentError, MedicalRecord, Paragraph, ParagraphStyle};

const DOCUMENT_PART: &str = "word/document.xml";

pub fn load_docx(path: &Path) -> Result<MedicalRecord, DocumentError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;
    parse_document_xml(&xml)
}

/// One paragraph per non-blank `w:p`, text runs concatenated in order.
pub fn parse_document_xml(xml: &str) -> Result<MedicalRecord, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    // Text boxes nest paragraphs inside paragraphs.
    let mut open: Vec<(String, ParagraphStyle)> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => open.push((String::new(), ParagraphStyle::Normal)),
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match (e.local_name().as_ref(), open.last_mut()) {
                (b"pStyle", Some((_, style))) => *style = style_from_id(&style_value(&e)?),
                (b"tab", Some((text, _))) => text.push('\t'),
                (b"br" | b"cr", Some((text, _))) => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some((text, _)) = open.last_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if let Some((text, style)) = open.pop() {
                        let text = text.trim();
                        if !text.is_empty() {
                            paragraphs.push(Paragraph { text: text.to_string(), style });
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(MedicalRecord::new(paragraphs))
}

fn style_value(element: &BytesStart<'_>) -> Result<String, DocumentError> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == b"val" {
            return Ok(String::from_utf8_lossy(&attr.value).into_owned());
        }
    }
    Ok(String::new())
}

/// `Heading1`..`Heading9` are headings; any other id keeps its name.
fn style_from_id(id: &str) -> ParagraphStyle {
    if id.is_empty() || id == "Normal" {
        return ParagraphStyle::Normal;
    }
    let level = id
        .get(..7)
        .filter(|prefix| prefix.eq_ignore_ascii_case("heading"))
        .and_then(|_| {
            let rest = id[7..].trim();
            if rest.is_empty() {
                Some(1)
            } else {
                rest.parse::<u8>().ok()
            }
        });
    match level {
        Some(level) => ParagraphStyle::Heading(level),
        None => ParagraphStyle::Other(id.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Patient Information</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">Date of Birth (DOB): </w:t></w:r><w:r><w:t>04/12/1971</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:pPr><w:pStyle w:val="ListParagraph"/></w:pPr><w:r><w:t>Rectal bleeding &amp; fatigue</w:t></w:r></w:p>
    <w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Request</w:t></w:r></w:p>
    <w:p><w:r><w:t>Requested procedure:</w:t><w:tab/><w:t>45378</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    fn write_docx(path: &Path, parts: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, content) in parts {
            let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn paragraphs_keep_order_text_and_style() {
        let record = parse_document_xml(BODY).unwrap();
        let paragraphs = record.paragraphs();

        assert_eq!(paragraphs.len(), 5);
        assert_eq!(paragraphs[0].style, ParagraphStyle::Heading(1));
        assert_eq!(paragraphs[0].text, "Patient Information");
        assert_eq!(paragraphs[1].text, "Date of Birth (DOB): 04/12/1971");
        assert_eq!(paragraphs[1].style, ParagraphStyle::Normal);
        assert_eq!(paragraphs[2].text, "Rectal bleeding & fatigue");
        assert_eq!(paragraphs[2].style.name(), "ListParagraph");
        assert_eq!(paragraphs[3].style, ParagraphStyle::Heading(2));
        assert_eq!(paragraphs[4].text, "Requested procedure:\t45378");
    }

    #[test]
    fn headings_are_left_out_of_the_collection() {
        let record = parse_document_xml(BODY).unwrap();
        assert_eq!(
            record.retrieval_collection(),
            vec![
                "Date of Birth (DOB): 04/12/1971",
                "Rectal bleeding & fatigue",
                "Requested procedure:\t45378",
            ]
        );
    }

    #[test]
    fn style_ids_map_to_styles() {
        assert_eq!(style_from_id("Heading3"), ParagraphStyle::Heading(3));
        assert_eq!(style_from_id("heading"), ParagraphStyle::Heading(1));
        assert_eq!(style_from_id(""), ParagraphStyle::Normal);
        assert_eq!(style_from_id("Title"), ParagraphStyle::Other("Title".into()));
        assert_eq!(style_from_id("HeadingNote"), ParagraphStyle::Other("HeadingNote".into()));
    }

    #[test]
    fn loads_docx_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.docx");
        write_docx(&path, &[("[Content_Types].xml", "<Types/>"), (DOCUMENT_PART, BODY)]);

        let record = load_docx(&path).unwrap();
        assert_eq!(record.paragraphs().len(), 5);
        assert!(record.full_text().starts_with("Patient Information\nDate of Birth"));
    }

    #[test]
    fn archive_without_document_part_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.docx");
        write_docx(&path, &[("word/styles.xml", "<w:styles/>")]);
        assert!(matches!(load_docx(&path), Err(DocumentError::Archive(_))));
    }

    #[test]
    fn non_zip_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.docx");
        std::fs::write(&path, "plain text pretending to be a docx").unwrap();
        assert!(matches!(load_docx(&path), Err(DocumentError::Archive(_))));
    }

    #[test]
    fn malformed_xml_is_rejected() {
        let xml = "<w:document><w:body><w:p><w:t>open</w:p></w:body></w:document>";
        assert!(matches!(parse_document_xml(xml), Err(DocumentError::Xml(_))));
    }
}
