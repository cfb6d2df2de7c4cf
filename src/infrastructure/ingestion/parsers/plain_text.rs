//! Plain text document parser

use async_trait::async_trait;

use crate::domain::ingestion::{
    DocumentMetadata, DocumentParser, PageText, ParsedDocument, ParserInput,
};
use crate::domain::DomainError;

/// Page separator, as emitted by `pdftotext`
const FORM_FEED: char = '\u{c}';

/// Parser for plain text files. Form feeds split pages.
#[derive(Debug, Clone, Default)]
pub struct PlainTextParser;

impl PlainTextParser {
    /// Create a new plain text parser
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentParser for PlainTextParser {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "text"]
    }

    fn supported_mime_types(&self) -> &[&str] {
        &["text/plain"]
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
        let id = input.document_id();

        if input.bytes.contains(&0) {
            return Err(DomainError::unreadable_document(format!(
                "{} looks like binary data, not text",
                input.filename
            )));
        }

        let content = std::str::from_utf8(&input.bytes).map_err(|e| {
            DomainError::unreadable_document(format!("{} is not valid UTF-8: {}", input.filename, e))
        })?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let pages = content
            .split(FORM_FEED)
            .enumerate()
            .map(|(i, text)| PageText::new(i as u32 + 1, text))
            .collect();

        Ok(ParsedDocument::new(id, input.filename, pages)
            .with_metadata(DocumentMetadata::new().with_mime_type("text/plain")))
    }
}
