//! Grounded prompt assembly under a fixed character budget
//!
//! Sections are admitted in priority order: the question, the instructions, retrieved
//! excerpts (most relevant first), then conversation history (newest first). The
//! result never exceeds the budget; a question that cannot fit on its own is rejected.

use serde::Serialize;

use crate::domain::query::HistoryTurn;
use crate::domain::retrieval::{RetrievedChunk, RetrievedContext};
use crate::domain::DomainError;

pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant that answers questions \
using only the document excerpts provided below. If the excerpts do not contain the answer, \
say that you could not find it in the uploaded documents. Do not make up facts. When you use \
information from an excerpt, cite it as (Source N).\n\n";

const EXCERPTS_HEADER: &str = "DOCUMENT EXCERPTS:\n\n";
const NO_EXCERPTS: &str = "DOCUMENT EXCERPTS: None found\n\n";
const HISTORY_HEADER: &str = "CONVERSATION HISTORY:\n";
const HISTORY_TRAILER: &str = "\n";

/// Prompt text plus what went into it
#[derive(Debug, Clone, Serialize)]
pub struct AssembledPrompt {
    pub text: String,
    /// Excerpts included, in `Source N` order (N = position + 1)
    pub included: Vec<RetrievedChunk>,
    /// Retrieved chunks left out for lack of budget
    pub dropped_chunks: usize,
    pub history_turns: usize,
    pub instructions_included: bool,
}

impl AssembledPrompt {
    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Builds bounded-length grounded prompts
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    max_length: usize,
    max_history_turns: usize,
    instructions: String,
}

impl PromptAssembler {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            max_history_turns: 8,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }

    pub fn with_max_history_turns(mut self, turns: usize) -> Self {
        self.max_history_turns = turns;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Assemble a prompt for `question` from `context` and optional prior turns
    pub fn assemble(
        &self,
        question: &str,
        context: &RetrievedContext,
        history: &[HistoryTurn],
    ) -> Result<AssembledPrompt, DomainError> {
        let question_section = format!("QUESTION: {}\n\nANSWER:", question.trim());
        let mut used = char_len(&question_section);

        if used > self.max_length {
            return Err(DomainError::validation(format!(
                "question is {} characters, prompt budget is {}",
                used, self.max_length
            )));
        }

        let instructions_included = self.fits(used, &self.instructions);
        if instructions_included {
            used += char_len(&self.instructions);
        }

        let mut excerpts = String::new();
        let mut included = Vec::new();
        let header_len = char_len(EXCERPTS_HEADER);

        for retrieved in context.chunks() {
            let block = excerpt_block(included.len() + 1, retrieved);
            let cost = char_len(&block) + if included.is_empty() { header_len } else { 0 };

            if used + cost > self.max_length {
                break;
            }

            if included.is_empty() {
                excerpts.push_str(EXCERPTS_HEADER);
            }
            excerpts.push_str(&block);
            used += cost;
            included.push(retrieved.clone());
        }

        if included.is_empty() && self.fits(used, NO_EXCERPTS) {
            excerpts.push_str(NO_EXCERPTS);
            used += char_len(NO_EXCERPTS);
        }

        let history_section = self.history_section(history, &mut used);

        let mut text = String::with_capacity(used);
        if instructions_included {
            text.push_str(&self.instructions);
        }
        text.push_str(&excerpts);
        text.push_str(&history_section.0);
        text.push_str(&question_section);

        debug_assert!(char_len(&text) <= self.max_length);

        Ok(AssembledPrompt {
            text,
            dropped_chunks: context.len() - included.len(),
            included,
            history_turns: history_section.1,
            instructions_included,
        })
    }

    /// Newest turns first while budget remains, rendered oldest to newest
    fn history_section(&self, history: &[HistoryTurn], used: &mut usize) -> (String, usize) {
        let recent = history
            .iter()
            .rev()
            .take(self.max_history_turns)
            .filter(|t| !t.content.trim().is_empty());

        let frame = char_len(HISTORY_HEADER) + char_len(HISTORY_TRAILER);
        let mut budget = self.max_length.saturating_sub(*used);
        if budget <= frame {
            return (String::new(), 0);
        }
        budget -= frame;

        let mut lines = Vec::new();
        for turn in recent {
            let line = format!("{}: {}\n", turn.role.label(), turn.content.trim());
            let cost = char_len(&line);
            if cost > budget {
                break;
            }
            budget -= cost;
            lines.push(line);
        }

        if lines.is_empty() {
            return (String::new(), 0);
        }

        let mut section = String::from(HISTORY_HEADER);
        for line in lines.iter().rev() {
            section.push_str(line);
        }
        section.push_str(HISTORY_TRAILER);

        *used += char_len(&section);
        (section, lines.len())
    }

    fn fits(&self, used: usize, piece: &str) -> bool {
        used + char_len(piece) <= self.max_length
    }
}

fn excerpt_block(source: usize, retrieved: &RetrievedChunk) -> String {
    let chunk = &retrieved.chunk;
    let pages = if chunk.pages.len() > 1 { "pages" } else { "page" };

    format!(
        "[Source {}] {}, {} {} (score {:.2})\n{}\n\n",
        source,
        chunk.filename,
        pages,
        chunk.page_label(),
        retrieved.score,
        chunk.content
    )
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
