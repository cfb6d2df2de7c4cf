use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable failure category, surfaced to API callers as `kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnreadableDocument,
    DimensionMismatch,
    EmbeddingUnavailable,
    GenerationUnavailable,
    Timeout,
    ModelMismatch,
    Validation,
    Configuration,
    Storage,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnreadableDocument => "unreadable_document",
            Self::DimensionMismatch => "dimension_mismatch",
            Self::EmbeddingUnavailable => "embedding_unavailable",
            Self::GenerationUnavailable => "generation_unavailable",
            Self::Timeout => "timeout",
            Self::ModelMismatch => "model_mismatch",
            Self::Validation => "validation",
            Self::Configuration => "configuration",
            Self::Storage => "storage",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unreadable document: {message}")]
    UnreadableDocument { message: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Embedding unavailable: {message}")]
    EmbeddingUnavailable { message: String },

    #[error("Generation unavailable: {message}")]
    GenerationUnavailable { message: String },

    #[error("Timed out: {operation} exceeded {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Model mismatch: index built with '{indexed}', configured '{configured}'")]
    ModelMismatch { indexed: String, configured: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn unreadable_document(message: impl Into<String>) -> Self {
        Self::UnreadableDocument {
            message: message.into(),
        }
    }

    pub fn dimension_mismatch(expected: usize, got: usize) -> Self {
        Self::DimensionMismatch { expected, got }
    }

    pub fn embedding_unavailable(message: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable {
            message: message.into(),
        }
    }

    pub fn generation_unavailable(message: impl Into<String>) -> Self {
        Self::GenerationUnavailable {
            message: message.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            seconds,
        }
    }

    pub fn model_mismatch(indexed: impl Into<String>, configured: impl Into<String>) -> Self {
        Self::ModelMismatch {
            indexed: indexed.into(),
            configured: configured.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Failure category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnreadableDocument { .. } => ErrorKind::UnreadableDocument,
            Self::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            Self::EmbeddingUnavailable { .. } => ErrorKind::EmbeddingUnavailable,
            Self::GenerationUnavailable { .. } => ErrorKind::GenerationUnavailable,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ModelMismatch { .. } => ErrorKind::ModelMismatch,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Whether the caller may reasonably retry the same operation later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingUnavailable { .. }
                | Self::GenerationUnavailable { .. }
                | Self::Timeout { .. }
        )
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_document_error() {
        let error = DomainError::unreadable_document("not a PDF");
        assert_eq!(error.to_string(), "Unreadable document: not a PDF");
        assert_eq!(error.kind(), ErrorKind::UnreadableDocument);
    }

    #[test]
    fn test_dimension_mismatch_error() {
        let error = DomainError::dimension_mismatch(384, 768);
        assert_eq!(
            error.to_string(),
            "Dimension mismatch: expected 384, got 768"
        );
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_backend_errors_are_retryable() {
        assert!(DomainError::embedding_unavailable("down").is_retryable());
        assert!(DomainError::generation_unavailable("down").is_retryable());
        assert!(DomainError::timeout("question", 30).is_retryable());
        assert!(!DomainError::validation("bad").is_retryable());
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::GenerationUnavailable).unwrap(),
            "\"generation_unavailable\""
        );
        assert_eq!(ErrorKind::UnreadableDocument.to_string(), "unreadable_document");
    }
}
