//! Query infrastructure - retrieval and question answering

mod pipeline;
mod retriever;

pub use pipeline::QueryPipeline;
pub use retriever::IndexRetriever;
