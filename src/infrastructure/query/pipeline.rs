//! Question answering pipeline
//!
//! retrieve -> assemble -> generate, under an overall deadline. Generation failures
//! surface as `GenerationUnavailable`; no answer is ever made up when the model fails.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::domain::query::{
    truncate_chars, Answer, Citation, HistoryTurn, ModelOutput, QueryConfig, MAX_SOURCE_CHARS,
};
use crate::domain::retrieval::Retriever;
use crate::domain::{
    DomainError, EmbeddingProvider, LlmProvider, LlmResponse, PromptAssembler, VectorIndex,
};
use crate::infrastructure::observability::{
    record_llm_request, record_query, LlmRequestMetricParams,
};

use super::retriever::IndexRetriever;

/// Excerpts quoted as sources when the model names none
const FALLBACK_SOURCES: usize = 5;

/// Answers questions from the shared index
#[derive(Debug, Clone)]
pub struct QueryPipeline {
    retriever: Arc<dyn Retriever>,
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LlmProvider>,
    assembler: PromptAssembler,
    config: QueryConfig,
}

impl QueryPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmProvider>,
        config: QueryConfig,
    ) -> Self {
        let retriever = IndexRetriever::new(embedder, Arc::clone(&index))
            .with_relevance_floor(config.relevance_floor);
        let assembler = PromptAssembler::new(config.max_prompt_length)
            .with_max_history_turns(config.max_history_turns);

        Self {
            retriever: Arc::new(retriever),
            index,
            llm,
            assembler,
            config,
        }
    }

    /// Use a different retriever
    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = retriever;
        self
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Answer `question`, optionally in the context of earlier turns
    pub async fn ask(&self, question: &str, history: &[HistoryTurn]) -> Result<Answer, DomainError> {
        let start = Instant::now();
        let question = question.trim();

        if question.is_empty() {
            return Err(DomainError::validation("question cannot be empty"));
        }

        let secs = self.config.timeout_secs;
        let deadline = Duration::from_secs(secs);
        let result = tokio::time::timeout(deadline, self.answer(question, history))
            .await
            .unwrap_or_else(|_| Err(DomainError::timeout("question", secs)));

        let status = match &result {
            Ok(answer) if answer.prompt_chars == 0 => "no_documents",
            Ok(_) => "success",
            Err(e) => e.kind().as_str(),
        };
        record_query(status, start.elapsed());

        match &result {
            Ok(answer) => info!(
                citations = answer.citations.len(),
                prompt_chars = answer.prompt_chars,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Question answered"
            ),
            Err(e) => warn!(kind = %e.kind(), error = %e, "Question failed"),
        }

        result
    }

    async fn answer(&self, question: &str, history: &[HistoryTurn]) -> Result<Answer, DomainError> {
        if self.index.is_empty().await {
            debug!("Index is empty, skipping generation");
            return Ok(Answer::no_documents());
        }

        let context = self.retriever.retrieve(question, self.config.top_k).await?;
        let prompt = self.assembler.assemble(question, &context, history)?;

        debug!(
            retrieved = context.len(),
            included = prompt.included.len(),
            dropped = prompt.dropped_chunks,
            history = prompt.history_turns,
            prompt_chars = prompt.len(),
            "Prompt assembled"
        );

        let response = self.generate(&prompt.text).await?;

        let citations = prompt
            .included
            .iter()
            .enumerate()
            .map(|(i, retrieved)| Citation::from_retrieved(i + 1, retrieved))
            .collect();

        let output = ModelOutput::parse(&response.text);
        let sources = if output.sources.is_empty() && output.structured.is_none() {
            prompt
                .included
                .iter()
                .take(FALLBACK_SOURCES)
                .enumerate()
                .map(|(i, retrieved)| {
                    let snippet = retrieved.chunk.content.replace('\n', " ");
                    format!("Source {}: {}", i + 1, truncate_chars(snippet.trim(), MAX_SOURCE_CHARS))
                })
                .collect()
        } else {
            output.sources
        };

        Ok(Answer {
            answer: output.answer,
            citations,
            prompt_chars: prompt.len(),
            model: Some(response.model),
            structured: output.structured,
            sources,
            raw: Some(response.text),
        })
    }

    /// Call the model, retrying once with the identical prompt when configured
    async fn generate(&self, prompt: &str) -> Result<LlmResponse, DomainError> {
        let attempts = if self.config.retry_once { 2 } else { 1 };
        let mut attempt = 1;

        loop {
            match self.complete_once(prompt).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < attempts && e.is_retryable() => {
                    warn!(attempt, error = %e, "Generation failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn complete_once(&self, prompt: &str) -> Result<LlmResponse, DomainError> {
        let start = Instant::now();
        let secs = self.config.generation_timeout_secs;
        let request = self.config.generation.request(prompt);

        let deadline = Duration::from_secs(secs);

        let result = match tokio::time::timeout(deadline, self.llm.complete(request)).await {
            Ok(Ok(response)) if response.is_blank() => Err(DomainError::generation_unavailable(
                "model returned an empty response",
            )),
            Ok(result) => result,
            Err(_) => Err(DomainError::generation_unavailable(format!(
                "no response within {}s",
                secs
            ))),
        };

        let usage = result.as_ref().ok().and_then(|r| r.usage.as_ref());
        record_llm_request(LlmRequestMetricParams {
            provider: self.llm.provider_name(),
            model: self.llm.model_name(),
            duration: start.elapsed(),
            success: result.is_ok(),
            input_tokens: usage.map(|u| u.prompt_tokens as u64),
            output_tokens: usage.map(|u| u.completion_tokens as u64),
        });

        result
    }
}
