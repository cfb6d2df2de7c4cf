//! Validation helpers for ingestion

use crate::domain::DomainError;

use super::pipeline::ParserType;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Detect parser type from filename extension
pub fn detect_parser_from_filename(filename: &str) -> Option<ParserType> {
    let (_, ext) = filename.rsplit_once('.')?;

    match ext.to_lowercase().as_str() {
        "pdf" => Some(ParserType::Pdf),
        "txt" | "text" => Some(ParserType::PlainText),
        _ => None,
    }
}

/// Detect parser type from MIME type
pub fn detect_parser_from_mime(mime: &str) -> Option<ParserType> {
    let mime_lower = mime.to_lowercase();

    if mime_lower.starts_with("application/pdf") {
        return Some(ParserType::Pdf);
    }

    if mime_lower.starts_with("text/plain") {
        return Some(ParserType::PlainText);
    }

    None
}

/// Detect parser type from leading bytes
pub fn detect_parser_from_content(bytes: &[u8]) -> ParserType {
    // Some writers emit a few junk bytes before the header
    let head = &bytes[..bytes.len().min(1024)];
    if head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        ParserType::Pdf
    } else {
        ParserType::PlainText
    }
}

/// Pick a parser: extension first, then declared MIME type, then content sniffing
pub fn detect_parser(filename: &str, mime: Option<&str>, bytes: &[u8]) -> ParserType {
    detect_parser_from_filename(filename)
        .or_else(|| mime.and_then(detect_parser_from_mime))
        .unwrap_or_else(|| detect_parser_from_content(bytes))
}

/// Validate an uploaded filename
pub fn validate_filename(filename: &str) -> Result<(), DomainError> {
    if filename.trim().is_empty() {
        return Err(DomainError::validation("Filename cannot be empty"));
    }

    if filename.len() > 255 {
        return Err(DomainError::validation(
            "Filename cannot exceed 255 characters",
        ));
    }

    Ok(())
}

/// Validate batch size
pub fn validate_batch_size(batch_size: usize) -> Result<(), DomainError> {
    if batch_size == 0 {
        return Err(DomainError::validation("Batch size must be greater than 0"));
    }

    if batch_size > 1000 {
        return Err(DomainError::validation("Batch size cannot exceed 1000"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_parser_from_filename() {
        assert_eq!(detect_parser_from_filename("doc.pdf"), Some(ParserType::Pdf));
        assert_eq!(detect_parser_from_filename("DOC.PDF"), Some(ParserType::Pdf));
        assert_eq!(
            detect_parser_from_filename("file.txt"),
            Some(ParserType::PlainText)
        );
        assert_eq!(detect_parser_from_filename("unknown.xyz"), None);
        assert_eq!(detect_parser_from_filename("noextension"), None);
    }

    #[test]
    fn test_detect_parser_from_mime() {
        assert_eq!(
            detect_parser_from_mime("application/pdf"),
            Some(ParserType::Pdf)
        );
        assert_eq!(
            detect_parser_from_mime("text/plain; charset=utf-8"),
            Some(ParserType::PlainText)
        );
        assert_eq!(detect_parser_from_mime("image/png"), None);
    }

    #[test]
    fn test_detect_parser_falls_back_to_sniffing() {
        assert_eq!(
            detect_parser("upload", None, b"%PDF-1.7\n..."),
            ParserType::Pdf
        );
        assert_eq!(
            detect_parser("upload", Some("application/octet-stream"), b"hello"),
            ParserType::PlainText
        );
        assert_eq!(
            detect_parser("notes.txt", Some("application/pdf"), b"%PDF"),
            ParserType::PlainText
        );
        assert_eq!(
            detect_parser("blob", Some("application/pdf"), b"hello"),
            ParserType::Pdf
        );
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("a.pdf").is_ok());
        assert!(validate_filename("  ").is_err());
        assert!(validate_filename(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_batch_size() {
        assert!(validate_batch_size(100).is_ok());
        assert!(validate_batch_size(0).is_err());
        assert!(validate_batch_size(1001).is_err());
    }
}
