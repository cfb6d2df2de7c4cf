//! Prompt assembly domain - grounded prompts built from retrieved excerpts

mod assembler;

pub use assembler::{AssembledPrompt, PromptAssembler, DEFAULT_INSTRUCTIONS};
