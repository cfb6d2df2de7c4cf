//! Question answering domain types

mod answer;
mod config;
mod output;

pub use answer::{Answer, Citation, HistoryRole, HistoryTurn, NO_DOCUMENTS_ANSWER};
pub use config::{GenerationOptions, QueryConfig};
pub use output::{ModelOutput, MAX_SOURCE_CHARS};
pub(crate) use output::truncate_chars;
