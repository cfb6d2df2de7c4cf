//! Retrieval domain types and traits

mod context;

pub use context::{RetrievedChunk, RetrievedContext, Retriever};
