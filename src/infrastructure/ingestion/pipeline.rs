//! Ingestion pipeline service
//!
//! Parse, chunk, embed, then insert. Every failure is caught per document and reported
//! in its `IngestionResult`; one bad upload never aborts the rest of a batch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::domain::ingestion::{
    detect_parser, validate_filename, BatchIngestionResult, Chunk, ChunkingStrategy,
    DocumentId, DocumentParser, IngestionConfig, IngestionResult, IngestionStatus, ParsedDocument,
    ParserInput,
};
use crate::domain::{DomainError, Embedding, EmbeddingProvider, IndexEntry, VectorIndex};
use crate::infrastructure::observability::{record_document_ingested, set_index_size};

use super::factory::{ChunkerFactory, ParserFactory};

/// Ingestion pipeline for processing uploads into the shared vector index
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chunker: Arc<dyn ChunkingStrategy>,
    parser: Option<Arc<dyn DocumentParser>>,
    config: IngestionConfig,
}

impl IngestionPipeline {
    /// Create a new ingestion pipeline
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            chunker: ChunkerFactory::create(),
            parser: None,
            config,
        }
    }

    /// Use a specific chunker instead of the default
    pub fn with_chunker(mut self, chunker: Arc<dyn ChunkingStrategy>) -> Self {
        self.chunker = chunker;
        self
    }

    /// Parse every upload with one parser instead of detecting by type
    pub fn with_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Ingest a single document
    pub async fn ingest(&self, input: ParserInput) -> IngestionResult {
        let start = Instant::now();
        let filename = input.filename.clone();
        let document_id = input.document_id();

        let result = match self.ingest_document(input, &document_id).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    filename = %filename,
                    document_id = %document_id.short(),
                    kind = %e.kind(),
                    error = %e,
                    "Document skipped"
                );
                IngestionResult::failed(filename, Some(document_id.to_string()), &e)
            }
        };

        let added = match result.status {
            IngestionStatus::Indexed => result.chunks_created,
            _ => 0,
        };
        record_document_ingested(result.status.as_str(), added, start.elapsed());

        result
    }

    /// Ingest multiple documents, in upload order
    pub async fn ingest_batch(&self, inputs: Vec<ParserInput>) -> BatchIngestionResult {
        let mut batch_result = BatchIngestionResult::new();

        for input in inputs {
            batch_result.add(self.ingest(input).await);
        }

        set_index_size(self.index.size().await);

        info!(
            documents = batch_result.total_documents,
            failed = batch_result.failed,
            chunks = batch_result.total_chunks_created(),
            "Upload processed"
        );

        batch_result
    }

    async fn ingest_document(
        &self,
        input: ParserInput,
        document_id: &DocumentId,
    ) -> Result<IngestionResult, DomainError> {
        let start = Instant::now();
        validate_filename(&input.filename)?;
        let filename = input.filename.clone();

        let existing = self.index.document_chunk_count(document_id).await;
        if existing > 0 {
            debug!(filename = %filename, document_id = %document_id.short(), "Already indexed");
            return Ok(IngestionResult::duplicate(
                filename,
                document_id.as_str(),
                existing,
            ));
        }

        let parsed = self.parse(input).await?;
        let warnings = blank_page_warnings(&parsed);

        let chunks = self
            .chunker
            .chunk(&parsed, &self.config.chunking_config)?;

        if chunks.is_empty() {
            return Ok(IngestionResult::empty(filename, document_id.as_str()));
        }

        let embeddings = self.embed_chunks(&chunks).await?;
        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry::new(chunk, embedding))
            .collect();

        let added = self.index.insert_batch(entries).await?;
        if added == 0 {
            // A concurrent upload of the same bytes got there first
            let existing = self.index.document_chunk_count(document_id).await;
            debug!(filename = %filename, document_id = %document_id.short(), "Indexed concurrently");
            return Ok(IngestionResult::duplicate(
                filename,
                document_id.as_str(),
                existing,
            ));
        }

        info!(
            filename = %filename,
            document_id = %document_id.short(),
            pages = parsed.page_count(),
            chunks = added,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Document indexed"
        );

        let mut result = IngestionResult::indexed(filename, document_id.as_str(), added);
        result.warnings = warnings;
        Ok(result)
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
        let parser = match &self.parser {
            Some(parser) => Arc::clone(parser),
            None => ParserFactory::create(detect_parser(
                &input.filename,
                input.mime_type.as_deref(),
                &input.bytes,
            )),
        };

        let secs = self.config.parse_timeout_secs;
        tokio::time::timeout(Duration::from_secs(secs), parser.parse(input))
            .await
            .map_err(|_| DomainError::timeout("parse", secs))?
    }

    /// Embed chunk texts in batches, several batches in flight, preserving order
    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Embedding>, DomainError> {
        let batches: Vec<Vec<String>> = chunks
            .chunks(self.config.batch_size.max(1))
            .map(|batch| batch.iter().map(|c| c.content.clone()).collect())
            .collect();

        let embedder = &self.embedder;
        let embeddings: Vec<Embedding> = stream::iter(batches)
            .map(|batch| async move {
                let embeddings = embedder.embed_batch(&batch).await?;
                if embeddings.len() != batch.len() {
                    return Err(DomainError::embedding_unavailable(format!(
                        "expected {} embeddings, got {}",
                        batch.len(),
                        embeddings.len()
                    )));
                }
                Ok(embeddings)
            })
            .buffered(self.config.concurrency.max(1))
            .try_collect::<Vec<Vec<Embedding>>>()
            .await?
            .into_iter()
            .flatten()
            .collect();

        Ok(embeddings)
    }
}

fn blank_page_warnings(document: &ParsedDocument) -> Vec<String> {
    let blank: Vec<String> = document
        .pages
        .iter()
        .filter(|p| p.is_blank())
        .map(|p| p.number.to_string())
        .collect();

    if blank.is_empty() || blank.len() == document.pages.len() {
        return Vec::new();
    }

    vec![format!("no extractable text on page(s) {}", blank.join(", "))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::ingestion::{MockDocumentParser, PageText};
    use crate::domain::ErrorKind;
    use crate::infrastructure::index::InMemoryVectorIndex;
    use crate::infrastructure::ingestion::parsers::fixtures::pdf_with_pages;

    fn pipeline_with(embedder: MockEmbeddingProvider) -> (IngestionPipeline, Arc<InMemoryVectorIndex>) {
        let index = Arc::new(InMemoryVectorIndex::default());
        let config = IngestionConfig::new()
            .with_chunk_size(200)
            .with_chunk_overlap(40)
            .with_batch_size(2);
        let pipeline = IngestionPipeline::new(Arc::new(embedder), index.clone(), config);
        (pipeline, index)
    }

    fn pipeline() -> (IngestionPipeline, Arc<InMemoryVectorIndex>) {
        pipeline_with(MockEmbeddingProvider::new(64))
    }

    fn words(n: usize, stem: &str) -> String {
        (0..n).map(|i| format!("{}{}", stem, i)).collect::<Vec<_>>().join(" ")
    }

    #[tokio::test]
    async fn test_ingest_pdf() {
        let (pipeline, index) = pipeline();
        let bytes = pdf_with_pages(&[Some("The pump runs at 40 bar."), Some("Service every 500 hours.")]);

        let result = pipeline
            .ingest(ParserInput::from_bytes(bytes).with_filename("manual.pdf"))
            .await;

        assert_eq!(result.status, IngestionStatus::Indexed);
        assert!(result.chunks_created >= 1);
        assert_eq!(index.size().await, result.chunks_created);
    }

    #[tokio::test]
    async fn test_blank_middle_page_contributes_no_chunks() {
        let (pipeline, index) = pipeline();
        let parser = MockDocumentParser::new().with_pages(vec![
            PageText::new(1, words(60, "alpha")),
            PageText::new(2, ""),
            PageText::new(3, words(60, "gamma")),
        ]);
        let pipeline = pipeline.with_parser(Arc::new(parser));

        let result = pipeline
            .ingest(ParserInput::from_bytes(b"scanned".to_vec()).with_filename("scan.pdf"))
            .await;

        assert_eq!(result.status, IngestionStatus::Indexed);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains('2'));

        let entries = index.entries().await;
        assert!(entries.iter().all(|e| !e.chunk.pages.contains(&2)));
        assert!(entries.iter().any(|e| e.chunk.pages.contains(&1)));
        assert!(entries.iter().any(|e| e.chunk.pages.contains(&3)));
    }

    #[tokio::test]
    async fn test_text_document_is_chunked_and_batched() {
        let embedder = MockEmbeddingProvider::new(32);
        let (pipeline, index) = pipeline_with(embedder);

        let result = pipeline
            .ingest(ParserInput::from_bytes(words(200, "word").into_bytes()).with_filename("notes.txt"))
            .await;

        assert_eq!(result.status, IngestionStatus::Indexed);
        assert!(result.chunks_created > 2);

        let entries = index.entries().await;
        let ordinals: Vec<usize> = entries.iter().map(|e| e.chunk.ordinal).collect();
        assert_eq!(ordinals, (0..entries.len()).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_reupload_is_duplicate() {
        let (pipeline, index) = pipeline();
        let input = || ParserInput::from_bytes(words(100, "same").into_bytes()).with_filename("a.txt");

        let first = pipeline.ingest(input()).await;
        let second = pipeline.ingest(input()).await;

        assert_eq!(first.status, IngestionStatus::Indexed);
        assert_eq!(second.status, IngestionStatus::Duplicate);
        assert_eq!(second.chunks_created, first.chunks_created);
        assert_eq!(index.size().await, first.chunks_created);
    }

    #[tokio::test]
    async fn test_empty_document_is_warning() {
        let (pipeline, index) = pipeline();

        let result = pipeline
            .ingest(ParserInput::from_bytes(b"   \n\t ".to_vec()).with_filename("blank.txt"))
            .await;

        assert_eq!(result.status, IngestionStatus::Empty);
        assert!(result.is_success());
        assert_eq!(result.warnings.len(), 1);
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn test_corrupted_file_does_not_fail_batch() {
        let (pipeline, index) = pipeline();
        let good = pdf_with_pages(&[Some("Hydraulic pressure is 40 bar.")]);

        let batch = pipeline
            .ingest_batch(vec![
                ParserInput::from_bytes(good).with_filename("good.pdf"),
                ParserInput::from_bytes(b"%PDF-1.7 garbage".to_vec()).with_filename("broken.pdf"),
            ])
            .await;

        assert_eq!(batch.total_documents, 2);
        assert_eq!(batch.successful, 1);
        assert_eq!(batch.failed, 1);
        assert!(batch.results[0].chunks_created > 0);

        let error = batch.results[1].error.as_ref().unwrap();
        assert_eq!(error.kind, ErrorKind::UnreadableDocument);
        assert_eq!(index.size().await, batch.results[0].chunks_created);
    }

    #[tokio::test]
    async fn test_embedding_failure_leaves_index_untouched() {
        let (pipeline, index) = pipeline_with(MockEmbeddingProvider::new(16).with_error("connection refused"));

        let result = pipeline
            .ingest(ParserInput::from_bytes(words(100, "x").into_bytes()).with_filename("a.txt"))
            .await;

        assert_eq!(result.status, IngestionStatus::Failed);
        assert_eq!(result.error.unwrap().kind, ErrorKind::EmbeddingUnavailable);
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_reported() {
        let index = Arc::new(InMemoryVectorIndex::default());
        let first = IngestionPipeline::new(
            Arc::new(MockEmbeddingProvider::new(16)),
            index.clone(),
            IngestionConfig::new(),
        );
        let second = IngestionPipeline::new(
            Arc::new(MockEmbeddingProvider::new(32)),
            index.clone(),
            IngestionConfig::new(),
        );

        first
            .ingest(ParserInput::from_bytes(b"first document".to_vec()).with_filename("a.txt"))
            .await;
        let result = second
            .ingest(ParserInput::from_bytes(b"second document".to_vec()).with_filename("b.txt"))
            .await;

        assert_eq!(result.error.unwrap().kind, ErrorKind::DimensionMismatch);
        assert_eq!(index.size().await, 1);
    }

    #[tokio::test]
    async fn test_parse_timeout() {
        #[derive(Debug)]
        struct SlowParser;

        #[async_trait::async_trait]
        impl DocumentParser for SlowParser {
            fn supported_extensions(&self) -> &[&str] {
                &["pdf"]
            }

            fn supported_mime_types(&self) -> &[&str] {
                &["application/pdf"]
            }

            async fn parse(&self, _input: ParserInput) -> Result<ParsedDocument, DomainError> {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Err(DomainError::internal("unreachable"))
            }
        }

        let index = Arc::new(InMemoryVectorIndex::default());
        let pipeline = IngestionPipeline::new(
            Arc::new(MockEmbeddingProvider::new(8)),
            index,
            IngestionConfig::new().with_parse_timeout_secs(1),
        )
        .with_parser(Arc::new(SlowParser));

        let result = pipeline
            .ingest(ParserInput::from_bytes(b"x".to_vec()).with_filename("slow.pdf"))
            .await;

        assert_eq!(result.error.unwrap().kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_concurrent_identical_uploads_index_once() {
        #[derive(Debug)]
        struct YieldingParser;

        #[async_trait::async_trait]
        impl DocumentParser for YieldingParser {
            fn supported_extensions(&self) -> &[&str] {
                &["txt"]
            }

            fn supported_mime_types(&self) -> &[&str] {
                &["text/plain"]
            }

            async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
                tokio::task::yield_now().await;
                crate::infrastructure::ingestion::PlainTextParser::new().parse(input).await
            }
        }

        let (pipeline, index) = pipeline();
        let pipeline = pipeline.with_parser(Arc::new(YieldingParser));
        let input = || ParserInput::from_bytes(words(100, "same").into_bytes()).with_filename("a.txt");

        let (first, second) = tokio::join!(pipeline.ingest(input()), pipeline.ingest(input()));

        let mut statuses = vec![first.status, second.status];
        statuses.sort_by_key(|s| s.as_str());
        assert_eq!(statuses, vec![IngestionStatus::Duplicate, IngestionStatus::Indexed]);
        assert_eq!(first.chunks_created, second.chunks_created);
        assert_eq!(index.size().await, first.chunks_created);
    }

    #[test]
    fn test_blank_page_warnings() {
        let id = DocumentId::new("abc");
        let all_blank = ParsedDocument::new(id.clone(), "a.pdf", vec![PageText::new(1, "")]);
        assert!(blank_page_warnings(&all_blank).is_empty());

        let mixed = ParsedDocument::new(
            id,
            "b.pdf",
            vec![PageText::new(1, "x"), PageText::new(2, " "), PageText::new(3, "")],
        );
        assert_eq!(
            blank_page_warnings(&mixed),
            vec!["no extractable text on page(s) 2, 3".to_string()]
        );
    }
}
