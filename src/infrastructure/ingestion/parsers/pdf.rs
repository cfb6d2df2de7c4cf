//! PDF document parser
//!
//! Text is extracted page by page. A page whose content cannot be decoded (typically a
//! scanned image) yields empty text and is listed in `unreadable_pages`; only a file
//! that cannot be opened at all is rejected. `lopdf` panics on some malformed inputs, so
//! each page is extracted under `catch_unwind` and a panic while opening the file counts
//! as an unreadable document.

use std::panic::{catch_unwind, AssertUnwindSafe};

use async_trait::async_trait;
use lopdf::{Document, Object};
use tracing::{debug, warn};

use crate::domain::ingestion::{
    DocumentMetadata, DocumentParser, PageText, ParsedDocument, ParserInput,
};
use crate::domain::DomainError;

/// Parser for PDF files
#[derive(Debug, Clone, Default)]
pub struct PdfParser;

impl PdfParser {
    /// Create a new PDF parser
    pub fn new() -> Self {
        Self
    }

    fn extract(input: ParserInput) -> Result<ParsedDocument, DomainError> {
        let id = input.document_id();

        let document = Document::load_mem(&input.bytes).map_err(|e| {
            DomainError::unreadable_document(format!("{}: {}", input.filename, e))
        })?;

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(DomainError::unreadable_document(format!(
                "{}: document has no pages",
                input.filename
            )));
        }

        let mut metadata = DocumentMetadata::new().with_mime_type("application/pdf");
        let mut pages = Vec::with_capacity(page_numbers.len());

        for number in page_numbers {
            let text = match page_text(&document, number) {
                Ok(text) => text,
                Err(reason) => {
                    warn!(filename = %input.filename, page = number, error = %reason, "Page text unavailable");
                    metadata.unreadable_pages.push(number);
                    String::new()
                }
            };
            pages.push(PageText::new(number, text));
        }

        if let Some(title) = info_string(&document, b"Title") {
            metadata = metadata.with_title(title);
        }
        if let Some(author) = info_string(&document, b"Author") {
            metadata = metadata.with_author(author);
        }

        debug!(
            filename = %input.filename,
            pages = pages.len(),
            unreadable = metadata.unreadable_pages.len(),
            "Parsed PDF"
        );

        Ok(ParsedDocument::new(id, input.filename, pages).with_metadata(metadata))
    }
}

fn page_text(document: &Document, number: u32) -> Result<String, String> {
    match catch_unwind(AssertUnwindSafe(|| document.extract_text(&[number]))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("text extraction panicked".to_string()),
    }
}

/// Read a string entry from the document information dictionary
fn info_string(document: &Document, key: &[u8]) -> Option<String> {
    let info = match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_object(*id).ok()?.as_dict().ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };

    let raw = info.get(key).ok()?.as_str().ok()?;
    let text = decode_pdf_string(raw);
    let text = text.trim();

    (!text.is_empty()).then(|| text.to_string())
}

/// PDF text strings are UTF-16BE when they carry a byte order mark
fn decode_pdf_string(raw: &[u8]) -> String {
    match raw.strip_prefix(&[0xfe, 0xff]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => String::from_utf8_lossy(raw).into_owned(),
    }
}

#[async_trait]
impl DocumentParser for PdfParser {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn supported_mime_types(&self) -> &[&str] {
        &["application/pdf"]
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
        let filename = input.filename.clone();

        match tokio::task::spawn_blocking(move || Self::extract(input)).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(DomainError::unreadable_document(format!(
                "{}: malformed PDF structure",
                filename
            ))),
            Err(e) => Err(DomainError::internal(format!("PDF parsing task failed: {}", e))),
        }
    }
}
