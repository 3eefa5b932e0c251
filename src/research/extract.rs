use lopdf::Document;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("not a readable PDF: {0}")]
    InvalidPdf(String),
}

/// Concatenates the text of every page, in page order.
///
/// A page whose text cannot be decoded contributes an empty string; only a
/// byte stream that is not a PDF at all is an error.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::InvalidPdf(e.to_string()))?;

    let pages: Vec<String> = doc
        .get_pages()
        .keys()
        .map(|&page| match doc.extract_text(&[page]) {
            Ok(text) => text,
            Err(e) => {
                debug!(page, error = %e, "page text unavailable");
                String::new()
            }
        })
        .collect();

    debug!(pages = pages.len(), "pdf text extracted");
    Ok(pages.join(" "))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{dictionary, Object, Stream};

    /// Builds a PDF with one page per entry; `None` leaves the page without
    /// a content stream.
    pub(crate) fn make_pdf(pages: &[Option<&str>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
            };
            if let Some(text) = text {
                let content = format!("BT /F1 12 Tf 72 700 Td ({}) Tj ET", text);
                let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
                page.set("Contents", content_id);
            }
            kids.push(doc.add_object(page).into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn extracts_text_from_digital_pdf() {
        let pdf = make_pdf(&[Some("Hello World from HealthEase")]);
        let text = extract_pdf_text(&pdf).unwrap();
        assert!(
            text.contains("Hello") || text.contains("World"),
            "unexpected text: {text}"
        );
    }

    #[test]
    fn page_without_content_does_not_fail_document() {
        let pdf = make_pdf(&[Some("Readable page"), None]);
        let text = extract_pdf_text(&pdf).unwrap();
        assert!(text.contains("Readable"), "unexpected text: {text}");
    }

    #[test]
    fn empty_document_yields_empty_text() {
        let pdf = make_pdf(&[None]);
        let text = extract_pdf_text(&pdf).unwrap();
        assert!(text.trim().is_empty());
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let err = extract_pdf_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidPdf(_)));
    }
}
