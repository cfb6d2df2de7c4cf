//! Infrastructure layer - Backends, storage and pipelines

pub mod embedding;
pub mod index;
pub mod ingestion;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod probe;
pub mod query;
