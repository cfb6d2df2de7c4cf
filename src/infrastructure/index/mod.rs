//! Vector index infrastructure - in-memory store, HNSW graph and checkpoints

mod checkpoint;
mod config;
mod hnsw;
mod in_memory;

pub use checkpoint::{CheckpointManifest, IndexCheckpoint, FORMAT_VERSION};
pub use config::IndexConfig;
pub use in_memory::InMemoryVectorIndex;
