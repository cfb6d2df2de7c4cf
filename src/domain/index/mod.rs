//! Vector index domain types and traits

mod entry;
mod store;

pub use entry::{IndexEntry, IndexStats, SearchHit, SimilarityMetric};
pub use store::VectorIndex;
